// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::{Date, OffsetDateTime};

/// Formats integer cents as Brazilian reais: `R$ 1.234,56`.
pub fn format_currency_brl(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let reais = cents / 100;
    let centavos = cents % 100;
    format!("{sign}R$ {},{centavos:02}", group_thousands(reais))
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

pub fn format_date(date: Date) -> String {
    date.format(&time::macros::format_description!(
        "[day]/[month]/[year]"
    ))
    .unwrap_or_else(|_| date.to_string())
}

pub fn format_date_time(moment: OffsetDateTime) -> String {
    moment
        .format(&time::macros::format_description!(
            "[day]/[month]/[year] [hour]:[minute]"
        ))
        .unwrap_or_else(|_| moment.to_string())
}

#[cfg(test)]
mod tests {
    use super::{format_currency_brl, format_date, format_date_time};
    use time::{Date, Month, OffsetDateTime, Time};

    #[test]
    fn currency_groups_thousands_with_dots() {
        assert_eq!(format_currency_brl(123_456), "R$ 1.234,56");
        assert_eq!(format_currency_brl(1_234_567_89), "R$ 1.234.567,89");
    }

    #[test]
    fn currency_pads_centavos() {
        assert_eq!(format_currency_brl(5), "R$ 0,05");
        assert_eq!(format_currency_brl(100), "R$ 1,00");
    }

    #[test]
    fn currency_keeps_sign() {
        assert_eq!(format_currency_brl(-9_950), "-R$ 99,50");
    }

    #[test]
    fn date_uses_day_month_year_order() {
        let date = Date::from_calendar_date(2026, Month::March, 7).expect("valid date");
        assert_eq!(format_date(date), "07/03/2026");
    }

    #[test]
    fn date_time_appends_hour_and_minute() {
        let date = Date::from_calendar_date(2026, Month::March, 7).expect("valid date");
        let time = Time::from_hms(14, 5, 0).expect("valid time");
        let moment = OffsetDateTime::new_utc(date, time);
        assert_eq!(format_date_time(moment), "07/03/2026 14:05");
    }
}
