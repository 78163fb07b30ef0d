//! Plaintext rendering of schedules
//!
//! The layout is consumed verbatim by the plaintext digest, so spacing and
//! date formats are fixed.

use crate::schedule::model::{DaySchedule, FullSchedule, Movie, Showing};
use chrono::NaiveDate;

const HEADER_DATE_FMT: &str = "%a, %B %d, %Y";
const RANGE_DATE_FMT: &str = "%a, %B %d";
const SHOWING_DATE_FMT: &str = "%a %B %d";
const CLOCK_FMT: &str = "%H:%M";

/// Dashed rule, label, dashed rule
fn header(label: &str) -> String {
    let rule = "-".repeat(label.chars().count() + 2);
    format!("{rule}\n {label}\n{rule}\n")
}

impl Showing {
    /// One detail line; `show_date` prefixes the weekday and date
    pub fn output(&self, show_date: bool) -> String {
        let mut line = String::new();
        if show_date {
            line.push_str(&self.start().format(SHOWING_DATE_FMT).to_string());
            line.push(' ');
        }

        line.push_str(&self.start().format(CLOCK_FMT).to_string());
        if self.start() != self.end() {
            line.push_str(" - ");
            line.push_str(&self.end().format(CLOCK_FMT).to_string());
        }

        line.push_str(&format!(" ({})", self.format()));
        if !self.languages().is_empty() {
            line.push_str(&format!(" ({})", self.languages().join(", ")));
        }
        if self.is_open_caption() {
            line.push_str(" (Open caption)");
        }
        if self.no_pass() {
            line.push_str(" (No A-List?)");
        }
        line
    }
}

impl Movie {
    /// Render this movie inside a schedule spanning `schedule_start..=schedule_end`
    pub fn output(
        &self,
        name_only: bool,
        date_only: bool,
        schedule_start: NaiveDate,
        schedule_end: NaiveDate,
    ) -> String {
        let multi_day = schedule_start != schedule_end;
        let mut output = self.name().to_string();

        if name_only {
            return output;
        }

        if date_only {
            let (Some(first), Some(last)) = (self.first(), self.last()) else {
                return output;
            };
            let partial = first.date() != schedule_start || last.date() != schedule_end;
            if multi_day && partial {
                let first_str = first.format(RANGE_DATE_FMT).to_string();
                let last_str = last.format(RANGE_DATE_FMT).to_string();
                if first_str == last_str {
                    output.push_str(&format!(" ({})", first_str));
                } else {
                    output.push_str(&format!(" ({} to {})", first_str, last_str));
                }
            }
            return output;
        }

        let mut showings: Vec<&Showing> = self.showings().iter().collect();
        showings.sort_by_key(|showing| showing.start());
        for showing in showings {
            output.push('\n');
            output.push_str(&showing.output(multi_day));
        }
        output
    }
}

impl DaySchedule {
    pub fn output(&self, name_only: bool) -> String {
        let label = self.day().format(HEADER_DATE_FMT).to_string();
        let mut movies: Vec<&Movie> = self.movies().iter().collect();
        movies.sort_by(|a, b| a.name().cmp(b.name()));

        let body: Vec<String> = movies
            .iter()
            .map(|movie| movie.output(name_only, false, self.day(), self.day()))
            .collect();
        header(&label) + &body.join("\n")
    }
}

impl FullSchedule {
    /// Render the whole range
    ///
    /// `name_only` lists titles; `date_only` collapses each movie's showings
    /// into the dates it plays when that differs from the full range.
    pub fn output(&self, name_only: bool, date_only: bool) -> String {
        let mut label = self.start().format(HEADER_DATE_FMT).to_string();
        if self.is_multi_day() {
            label.push_str(" - ");
            label.push_str(&self.end().format(HEADER_DATE_FMT).to_string());
        }

        let body: Vec<String> = self
            .movies()
            .map(|movie| movie.output(name_only, date_only, self.start(), self.end()))
            .collect();
        header(&label) + &body.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::runtime::RawRuntime;
    use chrono::NaiveTime;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn at(day: NaiveDate, h: u32, m: u32) -> chrono::NaiveDateTime {
        day.and_time(NaiveTime::from_hms_opt(h, m, 0).unwrap())
    }

    fn day(date: NaiveDate, movies: &[(&str, u32, &str)]) -> DaySchedule {
        let mut schedule = DaySchedule::new(date);
        for (title, runtime, time) in movies {
            schedule
                .add_raw_movie(title, &RawRuntime::Minutes(*runtime))
                .add_showing(&["Standard"], time, date)
                .unwrap();
        }
        schedule
    }

    #[test]
    fn test_showing_output_all_tags() {
        let start = at(d(2024, 1, 5), 19, 0);
        let showing = Showing::new(
            "3D",
            vec!["spanish".into(), "english".into()],
            true,
            true,
            start,
            at(d(2024, 1, 5), 20, 45),
        );

        assert_eq!(
            showing.output(false),
            "19:00 - 20:45 (3D) (spanish, english) (Open caption) (No A-List?)"
        );
        assert_eq!(
            showing.output(true),
            "Fri January 05 19:00 - 20:45 (3D) (spanish, english) (Open caption) (No A-List?)"
        );
    }

    #[test]
    fn test_showing_output_omits_end_for_unknown_runtime() {
        let start = at(d(2024, 1, 5), 9, 30);
        let showing = Showing::new("IMAX", vec![], false, false, start, start);
        assert_eq!(showing.output(false), "09:30 (IMAX)");
    }

    #[test]
    fn test_single_day_header_and_detail() {
        let schedule = FullSchedule::create(vec![day(
            d(2024, 1, 5),
            &[("Wonka", 116, "7:00p"), ("Migration", 83, "1:00p")],
        )])
        .unwrap();

        let expected = "\
-----------------------
 Fri, January 05, 2024
-----------------------
Migration
13:00 - 14:23 (Standard)
Wonka
19:00 - 20:56 (Standard)";
        assert_eq!(schedule.output(false, false), expected);
    }

    #[test]
    fn test_multi_day_header_and_sorted_detail() {
        let schedule = FullSchedule::create(vec![
            day(d(2024, 1, 6), &[("Wonka", 0, "1:00p")]),
            day(d(2024, 1, 5), &[("Wonka", 0, "7:00p")]),
        ])
        .unwrap();

        let label = "Fri, January 05, 2024 - Sat, January 06, 2024";
        let rule = "-".repeat(label.len() + 2);
        let expected = format!(
            "{rule}\n {label}\n{rule}\nWonka\nFri January 05 19:00 (Standard)\nSat January 06 13:00 (Standard)"
        );
        assert_eq!(schedule.output(false, false), expected);
    }

    #[test]
    fn test_name_only_lists_titles() {
        let schedule = FullSchedule::create(vec![day(
            d(2024, 1, 5),
            &[("Wonka", 116, "7:00p"), ("Aquaman", 124, "1:00p")],
        )])
        .unwrap();

        let output = schedule.output(true, false);
        assert!(output.ends_with("\nAquaman\nWonka"));
    }

    #[test]
    fn test_date_only_partial_run_gets_range() {
        // Oppenheimer plays Friday and Sunday inside a Thursday-Sunday schedule
        let schedule = FullSchedule::create(vec![
            day(d(2024, 1, 4), &[("Wonka", 116, "1:00p")]),
            day(d(2024, 1, 5), &[("Oppenheimer", 180, "7:00p"), ("Wonka", 116, "1:00p")]),
            day(d(2024, 1, 7), &[("Oppenheimer", 180, "7:00p"), ("Wonka", 116, "1:00p")]),
        ])
        .unwrap();

        let oppenheimer = schedule.movie("Oppenheimer").unwrap();
        assert_eq!(
            oppenheimer.output(false, true, schedule.start(), schedule.end()),
            "Oppenheimer (Fri, January 05 to Sun, January 07)"
        );

        let wonka = schedule.movie("Wonka").unwrap();
        assert_eq!(wonka.output(false, true, schedule.start(), schedule.end()), "Wonka");
    }

    #[test]
    fn test_date_only_full_run_is_collapsed() {
        let schedule = FullSchedule::create(vec![
            day(d(2024, 1, 5), &[("Oppenheimer", 180, "7:00p")]),
            day(d(2024, 1, 7), &[("Oppenheimer", 180, "7:00p")]),
        ])
        .unwrap();

        assert!(schedule.output(false, true).ends_with("\nOppenheimer"));
    }

    #[test]
    fn test_date_only_single_date_run() {
        let schedule = FullSchedule::create(vec![
            day(d(2024, 1, 5), &[("Wonka", 116, "1:00p")]),
            day(d(2024, 1, 6), &[("Wonka", 116, "1:00p"), ("Anyone But You", 103, "9:00p")]),
        ])
        .unwrap();

        let movie = schedule.movie("Anyone But You").unwrap();
        assert_eq!(
            movie.output(false, true, schedule.start(), schedule.end()),
            "Anyone But You (Sat, January 06)"
        );
    }

    #[test]
    fn test_date_only_single_day_schedule_never_annotates() {
        let schedule =
            FullSchedule::create(vec![day(d(2024, 1, 5), &[("Wonka", 116, "1:00p")])]).unwrap();
        assert!(schedule.output(false, true).ends_with("\nWonka"));
    }

    #[test]
    fn test_day_schedule_output() {
        let schedule = day(d(2024, 1, 5), &[("Wonka", 116, "7:00p")]);
        assert_eq!(
            schedule.output(true),
            "-----------------------\n Fri, January 05, 2024\n-----------------------\nWonka"
        );
    }
}
