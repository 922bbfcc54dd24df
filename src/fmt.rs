/// Euro amount rounded to cents, digits grouped by three: €1,234.56
pub fn money(val: f64) -> String {
    let cents = (val.abs() * 100.0).round() as u64;
    let units = (cents / 100).to_string();
    let grouped = units
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|group| std::str::from_utf8(group).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(",");
    let sign = if val < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}€{grouped}.{:02}", cents % 100)
}

pub fn percent(val: f64) -> String {
    format!("{val:.1}%")
}
