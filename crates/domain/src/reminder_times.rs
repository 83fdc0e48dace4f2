use crate::date::TimeOfDay;
use rand::Rng;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
#[error("Invalid reminder window: start `{start}` must be before end `{end}`")]
pub struct InvalidWindow {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

/// Draws `count` independent uniform wall-clock minutes in the half-open
/// window `[start, end)` and returns them sorted ascending.
///
/// Two reminders are allowed to land on the same minute, each draw is
/// independent of the others.
pub fn generate_random_times<R: Rng>(
    rng: &mut R,
    count: usize,
    start: TimeOfDay,
    end: TimeOfDay,
) -> Result<Vec<TimeOfDay>, InvalidWindow> {
    let start_minutes = start.minutes_since_midnight();
    let end_minutes = end.minutes_since_midnight();
    if start_minutes >= end_minutes {
        return Err(InvalidWindow { start, end });
    }

    let window_minutes = end_minutes - start_minutes;
    let mut times = (0..count)
        .map(|_| {
            let offset = rng.gen_range(0..window_minutes);
            // start_minutes + offset < 24 * 60, so this cannot fail
            TimeOfDay::from_minutes_since_midnight(start_minutes + offset).unwrap()
        })
        .collect::<Vec<_>>();
    times.sort();

    Ok(times)
}

#[cfg(test)]
mod test {
    use super::*;

    fn time(timestr: &str) -> TimeOfDay {
        timestr.parse().unwrap()
    }

    #[test]
    fn it_generates_sorted_times_within_the_window() {
        let mut rng = rand::thread_rng();
        let start = time("09:00");
        let end = time("21:00");

        for count in 1..=10 {
            let times = generate_random_times(&mut rng, count, start, end).unwrap();
            assert_eq!(times.len(), count);
            for window in times.windows(2) {
                assert!(window[0] <= window[1]);
            }
            for t in times {
                assert!(t >= start);
                assert!(t < end);
            }
        }
    }

    #[test]
    fn it_covers_a_single_minute_window() {
        let mut rng = rand::thread_rng();
        let times = generate_random_times(&mut rng, 3, time("12:00"), time("12:01")).unwrap();
        assert_eq!(times, vec![time("12:00"); 3]);
    }

    #[test]
    fn it_rejects_an_empty_window() {
        let mut rng = rand::thread_rng();
        let res = generate_random_times(&mut rng, 1, time("12:00"), time("12:00"));
        assert_eq!(
            res.unwrap_err(),
            InvalidWindow {
                start: time("12:00"),
                end: time("12:00"),
            }
        );
    }

    #[test]
    fn it_rejects_an_inverted_window() {
        let mut rng = rand::thread_rng();
        assert!(generate_random_times(&mut rng, 1, time("21:00"), time("09:00")).is_err());
    }
}
