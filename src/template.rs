use crate::schedule::{DayMask, PackedSchedule, DAYS};

/// Predefined weekly schedule presets.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Template {
    /// Mon-Fri, 8-18.
    Office,
    /// Every day, around the clock.
    Continuous,
    /// Mon-Fri, 6-12.
    Morning,
    /// Mon-Fri, 14-20.
    Afternoon,
}

/// Weekdays in wire order: Sunday off, Monday..Friday on, Saturday off.
const WEEKDAYS: [bool; DAYS] = [false, true, true, true, true, true, false];

impl Template {
    pub const ALL: [Template; 4] = [
        Template::Office,
        Template::Continuous,
        Template::Morning,
        Template::Afternoon,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Template::Office => "Office (Mon-Fri 8-18)",
            Template::Continuous => "Continuous (every day)",
            Template::Morning => "Morning (Mon-Fri 6-12)",
            Template::Afternoon => "Afternoon (Mon-Fri 14-20)",
        }
    }

    /// Enabled days in wire order (index 0 = Sunday).
    pub fn day_flags(self) -> [bool; DAYS] {
        match self {
            Template::Continuous => [true; DAYS],
            _ => WEEKDAYS,
        }
    }

    pub fn hour_range(self) -> (u8, u8) {
        match self {
            Template::Office => (8, 18),
            Template::Continuous => (0, 24),
            Template::Morning => (6, 12),
            Template::Afternoon => (14, 20),
        }
    }
}

/// Where the current draft values came from. Exactly one provenance is active
/// at all times; applying a template and editing by hand are mutually
/// exclusive.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Provenance {
    Template(Template),
    Custom,
}

/// An in-progress day-selection and hour-range configuration, before it is
/// packed and sent to a device.
#[derive(Clone, Debug)]
pub struct ScheduleDraft {
    days: [bool; DAYS],
    start_hour: u8,
    end_hour: u8,
    provenance: Provenance,
}

impl Default for ScheduleDraft {
    fn default() -> Self {
        Self {
            days: WEEKDAYS,
            start_hour: 8,
            end_hour: 18,
            provenance: Provenance::Custom,
        }
    }
}

impl ScheduleDraft {
    /// Replace the whole draft with the preset's values. Does not merge with
    /// prior edits.
    pub fn apply_template(&mut self, template: Template) {
        self.days = template.day_flags();
        let (start, end) = template.hour_range();
        self.start_hour = start;
        self.end_hour = end;
        self.provenance = Provenance::Template(template);
    }

    /// Flip one day (wire order index). Any manual edit drops the template
    /// selection.
    pub fn toggle_day(&mut self, index: usize) {
        self.days[index] = !self.days[index];
        self.provenance = Provenance::Custom;
    }

    pub fn set_start_hour(&mut self, hour: u8) {
        self.start_hour = hour;
        self.provenance = Provenance::Custom;
    }

    pub fn set_end_hour(&mut self, hour: u8) {
        self.end_hour = hour;
        self.provenance = Provenance::Custom;
    }

    pub fn days(&self) -> &[bool; DAYS] {
        &self.days
    }

    pub fn hour_range(&self) -> (u8, u8) {
        (self.start_hour, self.end_hour)
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn active_day_count(&self) -> usize {
        self.days.iter().filter(|enabled| **enabled).count()
    }

    /// Pack for the wire: the shared daily pattern from the hour range plus
    /// the day-enable mask.
    pub fn encode(&self) -> (PackedSchedule, DayMask) {
        (
            PackedSchedule::from_hour_range(self.start_hour, self.end_hour),
            DayMask::from_flags(&self.days),
        )
    }
}
