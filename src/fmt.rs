use rust_decimal::Decimal;

/// Format an amount the way the statements print it: dot-grouped
/// thousands, comma decimals, trailing euro sign. -1234.5 -> "-1.234,50 €"
pub fn money(val: Decimal) -> String {
    let negative = val < Decimal::ZERO;
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((&cents, "00"));

    let mut with_dots = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_dots.push('.');
        }
        with_dots.push(c);
    }
    let with_dots: String = with_dots.chars().rev().collect();

    if negative {
        format!("-{with_dots},{dec_part} \u{20ac}")
    } else {
        format!("{with_dots},{dec_part} \u{20ac}")
    }
}
