/// 德式数字格式：千分位 '.'，小数点 ','，固定小数位
pub fn format_de(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    // -0,00 这类舍入后为零的结果不带负号
    if value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push(',');
        out.push_str(frac);
    }
    out
}

/// 欧元金额 "1.234,56 €"
pub fn format_eur(amount: f64) -> String {
    format!("{} €", format_de(amount, 2))
}

/// 数量：整数不带小数，否则两位小数
pub fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format_de(quantity, 0)
    } else {
        format_de(quantity, 2)
    }
}

/// 不带小数部分的德式千分位写法 ("1.500"、"-1.234.567")
fn is_thousands_grouped(raw: &str) -> bool {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    let mut groups = digits.split('.');
    let head_ok = groups
        .next()
        .is_some_and(|head| (1..=3).contains(&head.len()) && head.bytes().all(|b| b.is_ascii_digit()));
    let mut tail_count = 0;
    let tail_ok = groups.all(|group| {
        tail_count += 1;
        group.len() == 3 && group.bytes().all(|b| b.is_ascii_digit())
    });
    head_ok && tail_ok && tail_count > 0
}

/// 解析数字，兼容德式 "1.234,56" / "1.500" 与普通 "1234.56"
///
/// 无逗号时，点号恰好构成三位一组的写法按千分位处理，因此 "1.500" 为 1500。
pub fn parse_decimal(raw: &str) -> Result<f64, String> {
    let trimmed = raw.trim().trim_end_matches('€').trim();
    if trimmed.is_empty() {
        return Err("empty number".to_string());
    }
    let normalized = if trimmed.contains(',') {
        trimmed.replace('.', "").replace(',', ".")
    } else if is_thousands_grouped(trimmed) {
        trimmed.replace('.', "")
    } else if trimmed.matches('.').count() > 1 {
        return Err(format!("ambiguous number '{}'", raw.trim()));
    } else {
        trimmed.to_string()
    };
    let value: f64 = normalized
        .parse()
        .map_err(|_| format!("invalid number '{}'", raw.trim()))?;
    if !value.is_finite() {
        return Err(format!("invalid number '{}'", raw.trim()));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_german_thousands_and_decimals() {
        assert_eq!(format_de(1234.5, 2), "1.234,50");
        assert_eq!(format_de(1_234_567.891, 2), "1.234.567,89");
        assert_eq!(format_de(999.0, 2), "999,00");
        assert_eq!(format_de(0.0, 2), "0,00");
        assert_eq!(format_de(-20_000.0, 2), "-20.000,00");
        assert_eq!(format_de(-0.001, 2), "0,00");
        assert_eq!(format_eur(5000.0), "5.000,00 €");
    }

    #[test]
    fn quantity_drops_zero_fraction() {
        assert_eq!(format_quantity(100.0), "100");
        assert_eq!(format_quantity(2.5), "2,50");
    }

    #[test]
    fn parses_both_notations() {
        assert_eq!(parse_decimal("1.234,56"), Ok(1234.56));
        assert_eq!(parse_decimal("1234.56"), Ok(1234.56));
        assert_eq!(parse_decimal(" 800 "), Ok(800.0));
        assert_eq!(parse_decimal("45,00 €"), Ok(45.0));
        assert_eq!(parse_decimal("1.500"), Ok(1500.0));
        assert_eq!(parse_decimal("1.234.567"), Ok(1_234_567.0));
        assert_eq!(parse_decimal("-2.000"), Ok(-2000.0));
        assert_eq!(parse_decimal("1.5"), Ok(1.5));
        assert_eq!(parse_decimal("12.50"), Ok(12.5));
        assert!(parse_decimal("1.23.4").is_err());
        assert!(parse_decimal("").is_err());
        assert!(parse_decimal("abc").is_err());
        assert!(parse_decimal("inf").is_err());
    }
}
