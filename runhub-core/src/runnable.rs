use chrono::{Duration, NaiveDateTime};

use crate::model::{ForecastSnapshot, HourSample};

/// The two fixed times of day a run is considered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Evening,
    Morning,
}

impl Slot {
    pub fn label(&self) -> &'static str {
        match self {
            Slot::Evening => "5 PM",
            Slot::Morning => "6 AM",
        }
    }

    pub const fn hour(&self) -> u32 {
        match self {
            Slot::Evening => 17,
            Slot::Morning => 6,
        }
    }
}

/// The pair of instants the forecast is evaluated at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetTimes {
    pub evening: NaiveDateTime,
    pub morning: NaiveDateTime,
}

impl TargetTimes {
    /// Derive both targets from the forecast's reported local time.
    ///
    /// The evening target is today's 17:00, rolled to tomorrow once the
    /// current time reaches the cutoff (17:00 exactly counts as past). The
    /// morning target is always tomorrow's 06:00.
    pub fn from_local(now: NaiveDateTime) -> Self {
        let mut evening = at_hour(now, Slot::Evening.hour());
        if now >= evening {
            evening += Duration::days(1);
        }

        let morning = at_hour(now, Slot::Morning.hour()) + Duration::days(1);

        Self { evening, morning }
    }

    pub fn for_slot(&self, slot: Slot) -> NaiveDateTime {
        match slot {
            Slot::Evening => self.evening,
            Slot::Morning => self.morning,
        }
    }
}

fn at_hour(now: NaiveDateTime, hour: u32) -> NaiveDateTime {
    now.date().and_hms_opt(hour, 0, 0).expect("cutoff hours are valid times of day")
}

/// Thresholds and toggles for the runnability decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunnabilityRule {
    /// Coldest runnable temperature, inclusive.
    pub min_temp_f: f64,
    /// Hottest runnable temperature, inclusive.
    pub max_temp_f: f64,
    /// Require the target time to fall between sunrise and sunset.
    pub require_daylight: bool,
}

impl Default for RunnabilityRule {
    fn default() -> Self {
        Self { min_temp_f: 55.0, max_temp_f: 90.0, require_daylight: false }
    }
}

/// Outcome of evaluating one hourly record. The reason is empty exactly when
/// the conditions are runnable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub is_runnable: bool,
    pub reason: String,
}

impl RunnabilityRule {
    /// Evaluate one hourly record, with `daylight` from the matching day's
    /// astro data (`None` when unknown).
    ///
    /// Reason clauses are emitted in fixed order: too cold, too hot, rain,
    /// snow, no daylight. When daylight gating is on, unknown daylight counts
    /// as not-daylit.
    pub fn evaluate(&self, sample: &HourSample, daylight: Option<bool>) -> Verdict {
        let mut clauses = Vec::new();

        if sample.temp_f < self.min_temp_f {
            clauses.push(format!("Temperature is {}°F, too cold.", sample.temp_f));
        }
        if sample.temp_f > self.max_temp_f {
            clauses.push(format!("Temperature is {}°F, too hot.", sample.temp_f));
        }
        if sample.will_rain {
            clauses.push("It will rain.".to_string());
        }
        if sample.will_snow {
            clauses.push("It will snow.".to_string());
        }
        if self.require_daylight && daylight != Some(true) {
            clauses.push("The sun won't be out.".to_string());
        }

        let reason =
            clauses.iter().map(|clause| format!("- {clause}")).collect::<Vec<_>>().join("\n");

        Verdict { is_runnable: clauses.is_empty(), reason }
    }
}

/// Runnability for one slot. `verdict` is `None` when the forecast had no
/// record at the target instant.
#[derive(Debug, Clone)]
pub struct TargetAssessment {
    pub slot: Slot,
    pub target: NaiveDateTime,
    pub verdict: Option<Verdict>,
}

/// Resolve both targets against the snapshot and evaluate each one.
pub fn assess(snapshot: &ForecastSnapshot, rule: &RunnabilityRule) -> Vec<TargetAssessment> {
    let targets = TargetTimes::from_local(snapshot.local_time);

    [Slot::Evening, Slot::Morning]
        .into_iter()
        .map(|slot| {
            let target = targets.for_slot(slot);
            let verdict = snapshot
                .sample_at(target)
                .map(|sample| rule.evaluate(sample, snapshot.daylight_at(target)));

            TargetAssessment { slot, target, verdict }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ForecastDay, LOCAL_TIME_FORMAT};
    use chrono::NaiveTime;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, LOCAL_TIME_FORMAT).expect("valid test timestamp")
    }

    fn sample(temp_f: f64, will_rain: bool, will_snow: bool) -> HourSample {
        HourSample { time: dt("2024-01-02 17:00"), temp_f, will_rain, will_snow }
    }

    fn runnable(temp_f: f64, will_rain: bool, will_snow: bool) -> bool {
        RunnabilityRule::default().evaluate(&sample(temp_f, will_rain, will_snow), None).is_runnable
    }

    #[test]
    fn evening_rolls_to_next_day_after_cutoff() {
        let targets = TargetTimes::from_local(dt("2024-01-01 18:00"));

        assert_eq!(targets.evening, dt("2024-01-02 17:00"));
        assert_eq!(targets.morning, dt("2024-01-02 06:00"));
    }

    #[test]
    fn evening_stays_today_before_cutoff() {
        let targets = TargetTimes::from_local(dt("2024-01-01 09:30"));

        assert_eq!(targets.evening, dt("2024-01-01 17:00"));
    }

    #[test]
    fn evening_cutoff_is_inclusive() {
        let targets = TargetTimes::from_local(dt("2024-01-01 17:00"));

        assert_eq!(targets.evening, dt("2024-01-02 17:00"));
    }

    #[test]
    fn morning_is_always_tomorrow() {
        let targets = TargetTimes::from_local(dt("2024-01-01 05:00"));

        assert_eq!(targets.morning, dt("2024-01-02 06:00"));
    }

    #[test]
    fn runnable_band_is_inclusive_and_dry() {
        assert!(runnable(55.0, false, false));
        assert!(runnable(72.5, false, false));
        assert!(runnable(90.0, false, false));

        assert!(!runnable(54.9, false, false));
        assert!(!runnable(90.1, false, false));
        assert!(!runnable(72.5, true, false));
        assert!(!runnable(72.5, false, true));
    }

    #[test]
    fn reason_is_empty_exactly_when_runnable() {
        let rule = RunnabilityRule::default();

        for temp_f in [30.0, 55.0, 60.0, 90.0, 95.0] {
            for will_rain in [false, true] {
                for will_snow in [false, true] {
                    let verdict = rule.evaluate(&sample(temp_f, will_rain, will_snow), None);
                    assert_eq!(verdict.is_runnable, verdict.reason.is_empty());
                }
            }
        }
    }

    #[test]
    fn hot_reason_carries_the_temperature() {
        let verdict = RunnabilityRule::default().evaluate(&sample(95.0, false, false), None);

        assert!(!verdict.is_runnable);
        assert!(verdict.reason.contains("too hot"));
        assert!(verdict.reason.contains("95°F"));
    }

    #[test]
    fn rain_alone_suppresses_the_temperature_clause() {
        let verdict = RunnabilityRule::default().evaluate(&sample(60.0, true, false), None);

        assert!(!verdict.is_runnable);
        assert!(verdict.reason.contains("rain"));
        assert!(!verdict.reason.contains("Temperature"));
    }

    #[test]
    fn clauses_keep_a_fixed_order() {
        let verdict = RunnabilityRule::default().evaluate(&sample(40.0, true, true), None);

        let cold = verdict.reason.find("too cold").expect("cold clause");
        let rain = verdict.reason.find("rain").expect("rain clause");
        let snow = verdict.reason.find("snow").expect("snow clause");
        assert!(cold < rain && rain < snow);
    }

    #[test]
    fn daylight_gating_is_off_by_default() {
        let verdict = RunnabilityRule::default().evaluate(&sample(70.0, false, false), Some(false));

        assert!(verdict.is_runnable);
    }

    #[test]
    fn daylight_gating_rejects_dark_and_unknown() {
        let rule = RunnabilityRule { require_daylight: true, ..Default::default() };
        let record = sample(70.0, false, false);

        assert!(rule.evaluate(&record, Some(true)).is_runnable);

        for daylight in [Some(false), None] {
            let verdict = rule.evaluate(&record, daylight);
            assert!(!verdict.is_runnable);
            assert!(verdict.reason.contains("sun won't be out"));
        }
    }

    fn snapshot_with_hours(hours: Vec<HourSample>) -> ForecastSnapshot {
        ForecastSnapshot {
            local_time: dt("2024-01-01 18:00"),
            days: vec![ForecastDay {
                date: dt("2024-01-02 00:00").date(),
                sunrise: NaiveTime::from_hms_opt(7, 20, 0),
                sunset: NaiveTime::from_hms_opt(16, 40, 0),
                hours,
            }],
        }
    }

    #[test]
    fn assess_covers_both_slots() {
        let snapshot = snapshot_with_hours(vec![
            HourSample {
                time: dt("2024-01-02 06:00"),
                temp_f: 60.0,
                will_rain: true,
                will_snow: false,
            },
            HourSample {
                time: dt("2024-01-02 17:00"),
                temp_f: 72.0,
                will_rain: false,
                will_snow: false,
            },
        ]);

        let assessments = assess(&snapshot, &RunnabilityRule::default());
        assert_eq!(assessments.len(), 2);

        let evening = &assessments[0];
        assert_eq!(evening.slot, Slot::Evening);
        assert_eq!(evening.target, dt("2024-01-02 17:00"));
        assert!(evening.verdict.as_ref().expect("evening record exists").is_runnable);

        let morning = &assessments[1];
        assert_eq!(morning.slot, Slot::Morning);
        assert_eq!(morning.target, dt("2024-01-02 06:00"));
        assert!(!morning.verdict.as_ref().expect("morning record exists").is_runnable);
    }

    #[test]
    fn assess_reports_missing_records_without_failing() {
        let snapshot = snapshot_with_hours(vec![HourSample {
            time: dt("2024-01-02 17:00"),
            temp_f: 72.0,
            will_rain: false,
            will_snow: false,
        }]);

        let assessments = assess(&snapshot, &RunnabilityRule::default());

        assert!(assessments[0].verdict.is_some());
        assert!(assessments[1].verdict.is_none());
    }
}
