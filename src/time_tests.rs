use super::{Date, Datetime, Time, TimeOffset, days_in_month, is_leap_year};

#[test]
fn leap_year_rules() {
    assert!(is_leap_year(2000));
    assert!(is_leap_year(2024));
    assert!(!is_leap_year(1900));
    assert!(!is_leap_year(2023));
    assert!(is_leap_year(1600));
    assert!(!is_leap_year(1000));
}

#[test]
fn month_lengths() {
    assert_eq!(days_in_month(2023, 1), 31);
    assert_eq!(days_in_month(2023, 2), 28);
    assert_eq!(days_in_month(2024, 2), 29);
    assert_eq!(days_in_month(2023, 4), 30);
    assert_eq!(days_in_month(2023, 12), 31);
    let total: u32 = (1..=12).map(|m| days_in_month(2023, m) as u32).sum();
    assert_eq!(total, 365);
}

#[test]
fn date_display_pads() {
    let d = Date {
        year: 987,
        month: 3,
        day: 7,
    };
    assert_eq!(d.to_string(), "0987-03-07");
}

#[test]
fn time_display_omits_zero_fraction() {
    let t = Time {
        hour: 4,
        minute: 5,
        second: 6,
        microsecond: 0,
    };
    assert_eq!(t.to_string(), "04:05:06");
}

#[test]
fn time_display_six_digit_fraction() {
    let t = Time {
        hour: 23,
        minute: 59,
        second: 59,
        microsecond: 1200,
    };
    assert_eq!(t.to_string(), "23:59:59.001200");
}

#[test]
fn offset_display() {
    assert_eq!(TimeOffset::Z.to_string(), "Z");
    assert_eq!(TimeOffset::Custom { minutes: 90 }.to_string(), "+01:30");
    assert_eq!(TimeOffset::Custom { minutes: -1 }.to_string(), "-00:01");
    assert_eq!(
        TimeOffset::Custom { minutes: -1439 }.to_string(),
        "-23:59"
    );
}

#[test]
fn datetime_display_variants() {
    let date = Date {
        year: 1979,
        month: 5,
        day: 27,
    };
    let time = Time {
        hour: 7,
        minute: 32,
        second: 0,
        microsecond: 999_999,
    };
    assert_eq!(
        Datetime::Offset {
            date,
            time,
            offset: TimeOffset::Custom { minutes: -480 },
        }
        .to_string(),
        "1979-05-27T07:32:00.999999-08:00"
    );
    assert_eq!(
        Datetime::Local { date, time }.to_string(),
        "1979-05-27T07:32:00.999999"
    );
    assert_eq!(Datetime::LocalDate(date).to_string(), "1979-05-27");
    assert_eq!(
        Datetime::LocalTime(Time {
            microsecond: 0,
            ..time
        })
        .to_string(),
        "07:32:00"
    );
}
