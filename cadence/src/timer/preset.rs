use super::durations::Durations;
use cadence_ipc::{DurationsPatch, PresetInfo};

pub const CUSTOM_PRESET_ID: &str = "custom";
pub const DEFAULT_PRESET_ID: &str = "pomodoro";

#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    pub id: String,
    pub title: String,
    pub description: String,
    pub badge: Option<String>,
    pub durations: Durations,
}

impl Preset {
    fn new(id: &str, title: &str, description: &str, badge: Option<&str>, durations: Durations) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            badge: badge.map(str::to_string),
            durations,
        }
    }

    pub fn is_custom(&self) -> bool {
        self.id == CUSTOM_PRESET_ID
    }
}

/// The selectable presets plus the currently selected one. The `custom` entry
/// always holds whatever the user last dialled in.
#[derive(Debug, Clone)]
pub struct PresetCatalog {
    presets: Vec<Preset>,
    selected: usize,
}

impl PresetCatalog {
    /// Built-in presets. Without long breaks every preset runs the two-phase
    /// focus/short-break cycle.
    pub fn builtin(long_breaks: bool, custom: Durations) -> Self {
        let profile = |d: Durations| {
            if long_breaks {
                d
            } else {
                d.without_long_break()
            }
        };
        let presets = vec![
            Preset::new(
                DEFAULT_PRESET_ID,
                "Pomodoro",
                "25 min focus, 5 min break. The classic rhythm.",
                Some("Classic"),
                profile(Durations::new(25, 5).with_long_break(15, 4)),
            ),
            Preset::new(
                "deep-focus",
                "Deep Focus",
                "90 min of focused work, then 20 min of rest.",
                Some("Intense"),
                profile(Durations::new(90, 20).with_long_break(30, 2)),
            ),
            Preset::new(
                CUSTOM_PRESET_ID,
                "Custom",
                "Set your own durations.",
                None,
                profile(custom.clamped()),
            ),
        ];
        Self {
            presets,
            selected: 0,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.id == id)
    }

    pub fn selected(&self) -> &Preset {
        &self.presets[self.selected]
    }

    /// Marks `id` selected and returns its durations.
    pub fn select(&mut self, id: &str) -> Option<Durations> {
        let index = self.presets.iter().position(|p| p.id == id)?;
        self.selected = index;
        Some(self.presets[index].durations)
    }

    /// Applies a duration change made through the controls. The change lands
    /// in the custom preset, which becomes selected; the returned durations are
    /// the `current` ones with the same change applied.
    pub fn customize(&mut self, current: &Durations, patch: &DurationsPatch) -> Durations {
        let index = self
            .presets
            .iter()
            .position(Preset::is_custom)
            .unwrap_or_else(|| {
                self.presets.push(Preset::new(
                    CUSTOM_PRESET_ID,
                    "Custom",
                    "Set your own durations.",
                    None,
                    *current,
                ));
                self.presets.len() - 1
            });
        let custom = &mut self.presets[index];
        custom.durations = custom.durations.patched(patch);
        self.selected = index;
        current.patched(patch)
    }

    pub fn to_info(&self) -> Vec<PresetInfo> {
        self.presets
            .iter()
            .enumerate()
            .map(|(i, p)| PresetInfo {
                id: p.id.clone(),
                title: p.title.clone(),
                description: p.description.clone(),
                badge: p.badge.clone(),
                focus_minutes: p.durations.focus_minutes,
                short_break_minutes: p.durations.short_break_minutes,
                long_break_minutes: p.durations.long_break.map(|lb| lb.minutes),
                cycles_before_long_break: p.durations.long_break.map(|lb| lb.every),
                selected: i == self.selected,
            })
            .collect()
    }
}
