use chrono::NaiveDate;

/// Australian dollars, e.g. `$1,234.56` or `-$70.00`.
pub fn money(amount: f64) -> String {
    if amount.is_nan() {
        return "$NaN".to_string();
    }
    let sign = if amount.is_sign_negative() && amount != 0.0 {
        "-"
    } else {
        ""
    };
    if amount.is_infinite() {
        return format!("{}$∞", sign);
    }

    let fixed = format!("{:.2}", amount.abs());
    let (int, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (i, c) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{}${}.{}", sign, grouped, frac)
}

/// Day-first short date, e.g. `01/04/2025`.
pub fn date(d: NaiveDate) -> String {
    d.format("%d/%m/%Y").to_string()
}
