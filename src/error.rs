use crate::models::Role;

/// 定价/汇总核心的错误
///
/// 核心只返回错误，不记录日志、不重试；由调用方决定是否中止外层流程。
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// 参数缺失或非法 (空成本组、负数量、非有限数值 ...)
    InvalidArgument(String),
    /// 条目ID不存在
    NotFound { id: String },
    /// 当前角色无权执行的修改
    PolicyViolation { role: Role, target: String },
}

impl EngineError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn policy(role: Role, target: impl Into<String>) -> Self {
        Self::PolicyViolation {
            role,
            target: target.into(),
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::NotFound { id } => write!(f, "item not found: {id}"),
            Self::PolicyViolation { role, target } => {
                write!(f, "policy violation: {role} may not {target}")
            }
        }
    }
}

impl std::error::Error for EngineError {}
