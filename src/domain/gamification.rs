//! Gamification rules
//!
//! Login streaks and daily mission planning as pure functions. Loading and
//! persisting profiles and assignments is done by
//! `services::gamification_service`.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::seq::SliceRandom;

/// Logins closer together than this keep the streak growing
pub const DEFAULT_STREAK_WINDOW_MINUTES: i64 = 5;

/// Total assignments handed out per profile and calendar day
pub const DEFAULT_DAILY_MISSION_QUOTA: usize = 2;

/// Keys of the missions the portal knows how to complete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MissionKey {
    DailyLogin,
    RateResource,
    SuggestResource,
    VisitResource,
}

impl MissionKey {
    pub const ALL: [MissionKey; 4] = [
        MissionKey::DailyLogin,
        MissionKey::RateResource,
        MissionKey::SuggestResource,
        MissionKey::VisitResource,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DailyLogin => "daily_login",
            Self::RateResource => "rate_resource",
            Self::SuggestResource => "suggest_resource",
            Self::VisitResource => "visit_resource",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "daily_login" => Some(Self::DailyLogin),
            "rate_resource" => Some(Self::RateResource),
            "suggest_resource" => Some(Self::SuggestResource),
            "visit_resource" => Some(Self::VisitResource),
            _ => None,
        }
    }
}

/// Compute the streak after a login at `now`.
///
/// - first login ever: 1
/// - previous login within `window`: streak + 1
/// - previous login older than `window`: back to 1
/// - `now` not after the previous login (duplicate event or clock skew):
///   unchanged
pub fn next_streak(
    current: i32,
    last_login: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    window: Duration,
) -> i32 {
    let Some(last_login) = last_login else {
        return 1;
    };

    let elapsed = now - last_login;
    if elapsed <= Duration::zero() {
        // A login has happened, so never report "never logged in"
        current.max(1)
    } else if elapsed <= window {
        current + 1
    } else {
        1
    }
}

/// Pick the missions to assign for a new day.
///
/// `catalog` must only contain active missions. The daily-login mission, when
/// present, is always planned first; the remaining `quota - 1` slots are a
/// uniform sample without replacement from the other missions.
pub fn plan_daily_missions<'a, T, R>(
    catalog: &'a [T],
    key_of: impl Fn(&T) -> &str,
    quota: usize,
    rng: &mut R,
) -> Vec<&'a T>
where
    R: Rng + ?Sized,
{
    if quota == 0 {
        return Vec::new();
    }

    let daily_login = MissionKey::DailyLogin.as_str();
    let mut planned: Vec<&T> = Vec::with_capacity(quota);

    if let Some(login) = catalog.iter().find(|m| key_of(*m) == daily_login) {
        planned.push(login);
    }

    let remaining = quota.saturating_sub(planned.len());
    if remaining == 0 {
        return planned;
    }

    let pool: Vec<&T> = catalog
        .iter()
        .filter(|m| key_of(*m) != daily_login)
        .collect();
    planned.extend(pool.choose_multiple(rng, remaining).copied());
    planned
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, h, m, 0).unwrap()
    }

    fn window() -> Duration {
        Duration::minutes(DEFAULT_STREAK_WINDOW_MINUTES)
    }

    #[test]
    fn first_login_starts_streak() {
        assert_eq!(next_streak(0, None, at(9, 0), window()), 1);
    }

    #[test]
    fn login_within_window_extends_streak() {
        assert_eq!(next_streak(1, Some(at(9, 0)), at(9, 2), window()), 2);
        assert_eq!(next_streak(2, Some(at(9, 0)), at(9, 5), window()), 3);
    }

    #[test]
    fn login_after_window_resets_streak() {
        assert_eq!(next_streak(7, Some(at(9, 0)), at(9, 6), window()), 1);
    }

    #[test]
    fn duplicate_or_skewed_login_leaves_streak() {
        assert_eq!(next_streak(4, Some(at(9, 0)), at(9, 0), window()), 4);
        assert_eq!(next_streak(4, Some(at(9, 10)), at(9, 0), window()), 4);
        assert_eq!(next_streak(0, Some(at(9, 0)), at(9, 0), window()), 1);
    }

    #[test]
    fn streak_sequence_matches_scenario() {
        let t0 = at(12, 0);
        let s1 = next_streak(0, None, t0, window());
        let s2 = next_streak(s1, Some(t0), at(12, 2), window());
        let s3 = next_streak(s2, Some(at(12, 2)), at(12, 12), window());
        assert_eq!((s1, s2, s3), (1, 2, 1));
    }

    #[test]
    fn mission_key_round_trips_known_keys() {
        for key in MissionKey::ALL {
            assert_eq!(MissionKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(MissionKey::parse("login_diario"), None);
    }

    #[test]
    fn plan_always_starts_with_daily_login() {
        let catalog = vec!["rate_resource", "daily_login", "visit_resource", "suggest_resource"];
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..50 {
            let planned = plan_daily_missions(&catalog, |k| *k, DEFAULT_DAILY_MISSION_QUOTA, &mut rng);
            assert_eq!(planned.len(), 2);
            assert_eq!(*planned[0], "daily_login");
            assert_ne!(*planned[1], "daily_login");
        }
    }

    #[test]
    fn plan_without_daily_login_samples_distinct_missions() {
        let catalog = vec!["rate_resource", "visit_resource", "suggest_resource"];
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..50 {
            let planned = plan_daily_missions(&catalog, |k| *k, DEFAULT_DAILY_MISSION_QUOTA, &mut rng);
            let distinct: HashSet<_> = planned.iter().collect();
            assert_eq!(planned.len(), 2);
            assert_eq!(distinct.len(), 2);
        }
    }

    #[test]
    fn plan_is_bounded_by_catalog_size() {
        let mut rng = StdRng::seed_from_u64(3);

        let only_login = vec!["daily_login"];
        let planned = plan_daily_missions(&only_login, |k| *k, 2, &mut rng);
        assert_eq!(planned, vec![&"daily_login"]);

        let empty: Vec<&str> = Vec::new();
        assert!(plan_daily_missions(&empty, |k| *k, 2, &mut rng).is_empty());
    }

    #[test]
    fn plan_reaches_every_mission_eventually() {
        let catalog = vec!["daily_login", "rate_resource", "visit_resource", "suggest_resource"];
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = HashSet::new();

        for _ in 0..200 {
            for key in plan_daily_missions(&catalog, |k| *k, 2, &mut rng) {
                seen.insert(*key);
            }
        }
        assert_eq!(seen.len(), catalog.len());
    }
}
