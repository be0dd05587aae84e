//! Session statistics for the stats overlay.
//!
//! Fed from published events only. The overlay never subscribes to the
//! bus, so reading stats can't change the simulation.

use serde::{Deserialize, Serialize};

use crate::{event::{EventLogEntry, SimEvent}, types::Frame};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub casts:              u32,
    pub bites:              u32,
    pub reels:              u32,
    pub catches:            u32,
    /// Mean time from a bite to the catch that followed it.
    pub mean_fight_ms:      Option<f64>,
    pub last_catch_frame:   Option<Frame>,
}

impl SessionStats {
    /// Rebuild stats from a stored log, e.g. `SimStore::events_for_run`.
    pub fn from_log(log: &[EventLogEntry]) -> Self {
        let mut tally = StatsTally::default();
        for entry in log {
            if let Some(event) = SimEvent::ALL.into_iter().find(|e| e.name() == entry.event_type) {
                tally.record(event, entry.frame, entry.elapsed_ms);
            }
        }
        tally.stats
    }
}

/// Running stats, fed one published event at a time by the engine.
#[derive(Debug, Clone, Default)]
pub struct StatsTally {
    stats:          SessionStats,
    bite_at:        Option<u64>,
    fight_total_ms: u64,
    fights:         u32,
}

impl StatsTally {
    pub fn record(&mut self, event: SimEvent, frame: Frame, elapsed_ms: u64) {
        let stats = &mut self.stats;
        match event {
            SimEvent::Reset => {
                stats.casts += 1;
                self.bite_at = None;
            }
            SimEvent::FishFight => {
                stats.bites += 1;
                self.bite_at = Some(elapsed_ms);
            }
            SimEvent::FishermanFight => stats.reels += 1,
            SimEvent::FishCaught => {
                stats.catches += 1;
                stats.last_catch_frame = Some(frame);
                if let Some(start) = self.bite_at.take() {
                    self.fight_total_ms += elapsed_ms.saturating_sub(start);
                    self.fights += 1;
                    stats.mean_fight_ms =
                        Some(self.fight_total_ms as f64 / f64::from(self.fights));
                }
            }
        }
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(frame: Frame, elapsed_ms: u64, event: SimEvent) -> EventLogEntry {
        EventLogEntry {
            id: None,
            run_id: "stats".into(),
            frame,
            elapsed_ms,
            source: "test".into(),
            event_type: event.name().into(),
            depth: 0,
            payload: String::new(),
        }
    }

    #[test]
    fn pairs_each_catch_with_preceding_bite() {
        let log = vec![
            entry(0, 0, SimEvent::Reset),
            entry(200, 3_000, SimEvent::FishFight),
            entry(350, 5_500, SimEvent::FishermanFight),
            entry(800, 13_000, SimEvent::FishCaught),
            entry(1100, 18_000, SimEvent::Reset),
            entry(1300, 21_000, SimEvent::FishFight),
            entry(1700, 27_000, SimEvent::FishCaught),
        ];
        let stats = SessionStats::from_log(&log);

        assert_eq!(stats.casts, 2);
        assert_eq!(stats.bites, 2);
        assert_eq!(stats.reels, 1);
        assert_eq!(stats.catches, 2);
        assert_eq!(stats.mean_fight_ms, Some(8_000.0));
        assert_eq!(stats.last_catch_frame, Some(1700));
    }

    #[test]
    fn catch_without_bite_leaves_mean_untouched() {
        let mut tally = StatsTally::default();
        tally.record(SimEvent::Reset, 0, 0);
        tally.record(SimEvent::FishCaught, 90, 1_500);

        assert_eq!(tally.stats().catches, 1);
        assert_eq!(tally.stats().mean_fight_ms, None);
        assert_eq!(tally.stats().last_catch_frame, Some(90));
    }

    #[test]
    fn empty_log_has_no_fight_time() {
        assert_eq!(SessionStats::from_log(&[]), SessionStats::default());
    }
}
