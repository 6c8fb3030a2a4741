use crate::time::{Clock, TimeOfDay};

/// 24-hour `HH:MM:SS`.
pub fn format_time_of_day(t: TimeOfDay) -> String {
    format!("{:02}:{:02}:{:02}", t.hour, t.minute, t.second)
}

/// Text shown in the ring's hub, read from `clock` on every call.
pub fn clock_face(clock: &dyn Clock) -> String {
    format_time_of_day(clock.now().time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::{CalendarDate, FixedClock, LocalDateTime};

    #[test]
    fn test_zero_padded_24_hour() {
        let t = TimeOfDay {
            hour: 7,
            minute: 5,
            second: 9,
        };
        assert_eq!(format_time_of_day(t), "07:05:09");
        let t = TimeOfDay {
            hour: 23,
            minute: 59,
            second: 59,
        };
        assert_eq!(format_time_of_day(t), "23:59:59");
    }

    #[test]
    fn test_clock_face_reads_clock() {
        let date = CalendarDate::new(2026, 10, 19).unwrap();
        let clock = FixedClock(LocalDateTime {
            date,
            time: TimeOfDay {
                hour: 13,
                minute: 4,
                second: 0,
            },
        });
        assert_eq!(clock_face(&clock), "13:04:00");
    }
}
