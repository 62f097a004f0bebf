use serde::{Deserialize, Serialize};

pub const DAYS: usize = 7;
pub const HOURS_PER_DAY: usize = 24;
pub const QUARTERS_PER_HOUR: usize = 4;
/// One byte per two hours: low nibble = even hour, high nibble = odd hour.
pub const SCHEDULE_BYTES: usize = 12;

/// Grid rows are Monday-first (0 = Mon .. 6 = Sun). The wire mask is
/// Sunday-first (bit 0 = Sun, bits 1..6 = Mon..Sat).
const WIRE_BIT_FOR_GRID_DAY: [u8; DAYS] = [1, 2, 3, 4, 5, 6, 0];

/// Byte index and bit mask for one quarter-hour slot.
fn slot_bit(hour: usize, quarter: usize) -> (usize, u8) {
    let shift = if hour % 2 == 1 { quarter + 4 } else { quarter };
    (hour / 2, 1 << shift)
}

/// Weekly activation grid: 7 days x 24 hours x 4 quarter-hour slots.
///
/// This is the editable form. The wire form ([`PackedSchedule`]) carries a
/// single daily pattern for all enabled days, so encoding a grid with
/// different patterns on different days loses the per-day distinctions.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct WeeklyGrid {
    slots: [[[bool; QUARTERS_PER_HOUR]; HOURS_PER_DAY]; DAYS],
}

impl Default for WeeklyGrid {
    fn default() -> Self {
        Self {
            slots: [[[false; QUARTERS_PER_HOUR]; HOURS_PER_DAY]; DAYS],
        }
    }
}

impl WeeklyGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, day: usize, hour: usize, quarter: usize) -> bool {
        self.slots[day][hour][quarter]
    }

    pub fn set(&mut self, day: usize, hour: usize, quarter: usize, active: bool) {
        self.slots[day][hour][quarter] = active;
    }

    /// Flip exactly one quarter-hour slot. Toggling twice restores the grid.
    pub fn toggle(&mut self, day: usize, hour: usize, quarter: usize) {
        self.slots[day][hour][quarter] = !self.slots[day][hour][quarter];
    }

    pub fn day_has_activity(&self, day: usize) -> bool {
        self.slots[day]
            .iter()
            .any(|hour| hour.iter().any(|quarter| *quarter))
    }

    /// Overwrite all 96 quarter flags of `to` with those of `from` in one step.
    pub fn copy_day(&mut self, from: usize, to: usize) {
        self.slots[to] = self.slots[from];
    }

    /// Replicate Monday onto Tuesday..Friday.
    pub fn copy_monday_to_weekdays(&mut self) {
        for day in 1..=4 {
            self.copy_day(0, day);
        }
    }

    pub fn clear_day(&mut self, day: usize) {
        self.slots[day] = [[false; QUARTERS_PER_HOUR]; HOURS_PER_DAY];
    }

    pub fn clear_all(&mut self) {
        *self = Self::default();
    }

    pub fn count_active_quarters(&self) -> usize {
        self.slots
            .iter()
            .flatten()
            .flatten()
            .filter(|quarter| **quarter)
            .count()
    }

    /// Scheduled hours per week, at quarter-hour granularity.
    pub fn weekly_hours(&self) -> f32 {
        self.count_active_quarters() as f32 * 0.25
    }

    /// Pack into the wire form. The 12 bytes are the union (logical OR) of
    /// every day's quarter pattern; the mask records which days had at least
    /// one active quarter.
    pub fn encode(&self) -> (PackedSchedule, DayMask) {
        (PackedSchedule::from_grid(self), DayMask::from_grid(self))
    }
}

/// 12-byte packed daily schedule, as sent to the controller.
///
/// Byte `b` encodes hour `2b` in its low nibble and hour `2b + 1` in its high
/// nibble; bit `k` of a nibble is quarter `k` of that hour. The pattern
/// applies uniformly to every day enabled in the accompanying [`DayMask`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct PackedSchedule(pub [u8; SCHEDULE_BYTES]);

impl PackedSchedule {
    /// Activate all four quarters of every hour in `[start_hour, end_hour)`.
    /// Hours at or above 24 are ignored, never wrapped; an empty or inverted
    /// range yields an all-zero schedule.
    pub fn from_hour_range(start_hour: u8, end_hour: u8) -> Self {
        let mut bytes = [0u8; SCHEDULE_BYTES];
        for hour in 0..HOURS_PER_DAY {
            if hour >= start_hour as usize && hour < end_hour as usize {
                for quarter in 0..QUARTERS_PER_HOUR {
                    let (byte, bit) = slot_bit(hour, quarter);
                    bytes[byte] |= bit;
                }
            }
        }
        Self(bytes)
    }

    /// Union of all days' quarter activity per absolute hour.
    pub fn from_grid(grid: &WeeklyGrid) -> Self {
        let mut bytes = [0u8; SCHEDULE_BYTES];
        for day in 0..DAYS {
            for hour in 0..HOURS_PER_DAY {
                for quarter in 0..QUARTERS_PER_HOUR {
                    if grid.is_active(day, hour, quarter) {
                        let (byte, bit) = slot_bit(hour, quarter);
                        bytes[byte] |= bit;
                    }
                }
            }
        }
        Self(bytes)
    }

    /// Expand back into a grid, replicating the single daily pattern across
    /// all seven days. Per-day differences cannot be reconstructed from the
    /// wire form.
    pub fn expand(&self) -> WeeklyGrid {
        let mut grid = WeeklyGrid::new();
        for day in 0..DAYS {
            for hour in 0..HOURS_PER_DAY {
                for quarter in 0..QUARTERS_PER_HOUR {
                    let (byte, bit) = slot_bit(hour, quarter);
                    grid.set(day, hour, quarter, self.0[byte] & bit != 0);
                }
            }
        }
        grid
    }

    pub fn as_bytes(&self) -> &[u8; SCHEDULE_BYTES] {
        &self.0
    }
}

/// 7-bit day-enable mask in broker wire order: bit 0 = Sunday, 1 = Monday,
/// .. 6 = Saturday.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct DayMask(pub u8);

impl DayMask {
    /// A day bit is set iff that day has at least one active quarter.
    pub fn from_grid(grid: &WeeklyGrid) -> Self {
        let mut mask = 0u8;
        for day in 0..DAYS {
            if grid.day_has_activity(day) {
                mask |= 1 << WIRE_BIT_FOR_GRID_DAY[day];
            }
        }
        Self(mask)
    }

    /// Build from day flags already in wire order (index 0 = Sunday).
    pub fn from_flags(days: &[bool; DAYS]) -> Self {
        let mut mask = 0u8;
        for (index, enabled) in days.iter().enumerate() {
            if *enabled {
                mask |= 1 << index;
            }
        }
        Self(mask)
    }

    pub fn contains_grid_day(self, day: usize) -> bool {
        self.0 & (1 << WIRE_BIT_FOR_GRID_DAY[day]) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Drag-to-paint editing over grid cells.
///
/// Pressing a cell flips it and starts painting with the flipped value;
/// entering further cells while dragging stamps that value; releasing ends
/// the gesture. Decoupled from any input-device API.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum PaintGesture {
    #[default]
    Idle,
    Dragging {
        paint: bool,
    },
}

impl PaintGesture {
    pub fn press(&mut self, grid: &mut WeeklyGrid, day: usize, hour: usize, quarter: usize) {
        let paint = !grid.is_active(day, hour, quarter);
        grid.set(day, hour, quarter, paint);
        *self = Self::Dragging { paint };
    }

    pub fn enter(&mut self, grid: &mut WeeklyGrid, day: usize, hour: usize, quarter: usize) {
        if let Self::Dragging { paint } = self {
            grid.set(day, hour, quarter, *paint);
        }
    }

    pub fn release(&mut self) {
        *self = Self::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn hour_range_packs_both_nibbles() {
        let packed = PackedSchedule::from_hour_range(8, 18);

        // Hour 8 fills byte 4's low nibble, hour 9 its high nibble.
        assert_eq!(packed.0[4], 0xFF);
        // Hour 17 is the high nibble of byte 8.
        assert_eq!(packed.0[8] & 0xF0, 0xF0);
        // Hours 22-23 are outside the range.
        assert_eq!(packed.0[11], 0x00);
    }

    #[test]
    fn hour_range_round_trips_through_grid() {
        for (start, end) in [(0u8, 24u8), (8, 18), (6, 12), (23, 24)] {
            let grid = PackedSchedule::from_hour_range(start, end).expand();
            for day in 0..DAYS {
                for hour in 0..HOURS_PER_DAY {
                    let expect = hour >= start as usize && hour < end as usize;
                    for quarter in 0..QUARTERS_PER_HOUR {
                        assert_eq!(
                            grid.is_active(day, hour, quarter),
                            expect,
                            "day {day} hour {hour} quarter {quarter} for {start}..{end}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn degenerate_ranges_yield_zero() {
        assert_eq!(PackedSchedule::from_hour_range(10, 10).0, [0; SCHEDULE_BYTES]);
        assert_eq!(PackedSchedule::from_hour_range(18, 8).0, [0; SCHEDULE_BYTES]);
        // Out-of-range hours are ignored, not wrapped.
        assert_eq!(PackedSchedule::from_hour_range(24, 30).0, [0; SCHEDULE_BYTES]);
    }

    #[test]
    fn uniform_grid_round_trips_exactly() {
        let mut grid = WeeklyGrid::new();
        for day in 0..DAYS {
            grid.set(day, 7, 2, true);
            grid.set(day, 21, 0, true);
        }

        let (packed, mask) = grid.encode();
        assert_eq!(packed.expand(), grid);
        assert_eq!(mask.0, 0x7F);
    }

    #[test]
    fn non_uniform_grid_decodes_to_shared_union() {
        let mut grid = WeeklyGrid::new();
        grid.set(0, 6, 0, true); // Monday only
        grid.set(3, 20, 3, true); // Thursday only

        let (packed, _) = grid.encode();
        let expanded = packed.expand();

        // Every day carries the union of both patterns.
        for day in 0..DAYS {
            assert!(expanded.is_active(day, 6, 0));
            assert!(expanded.is_active(day, 20, 3));
        }
        assert_eq!(expanded.count_active_quarters(), 2 * DAYS);

        // Expanding is idempotent.
        let (repacked, _) = expanded.encode();
        assert_eq!(repacked, packed);
    }

    #[test]
    fn day_mask_uses_wire_bit_order() {
        // Grid day index -> expected wire bit value.
        let expected = [
            (0, 1 << 1), // Monday
            (1, 1 << 2),
            (2, 1 << 3),
            (3, 1 << 4),
            (4, 1 << 5),
            (5, 1 << 6), // Saturday
            (6, 1 << 0), // Sunday
        ];
        for (day, bit) in expected {
            let mut grid = WeeklyGrid::new();
            grid.set(day, 12, 1, true);
            let mask = DayMask::from_grid(&grid);
            assert_eq!(mask.0, bit, "grid day {day}");
            assert!(mask.contains_grid_day(day));
        }
    }

    #[test]
    fn toggle_is_an_involution() {
        let mut grid = WeeklyGrid::new();
        grid.toggle(2, 9, 3);
        assert!(grid.is_active(2, 9, 3));
        grid.toggle(2, 9, 3);
        assert_eq!(grid, WeeklyGrid::new());
    }

    #[test]
    fn quarter_counting() {
        let grid = WeeklyGrid::new();
        assert_eq!(grid.count_active_quarters(), 0);

        // Hour 8-9 active on every day: 4 quarters x 7 days.
        let mut grid = WeeklyGrid::new();
        for day in 0..DAYS {
            for quarter in 0..QUARTERS_PER_HOUR {
                grid.set(day, 8, quarter, true);
            }
        }
        assert_eq!(grid.count_active_quarters(), 28);
        assert_eq!(grid.weekly_hours(), 7.0);
    }

    #[test]
    fn day_copy_and_clear_are_whole_day() {
        let mut grid = WeeklyGrid::new();
        grid.set(0, 8, 0, true);
        grid.set(0, 17, 3, true);
        grid.set(1, 3, 1, true);

        grid.copy_day(0, 1);
        assert!(grid.is_active(1, 8, 0));
        assert!(grid.is_active(1, 17, 3));
        // The copy replaces the whole day, old slots included.
        assert!(!grid.is_active(1, 3, 1));

        grid.copy_monday_to_weekdays();
        for day in 1..=4 {
            assert!(grid.is_active(day, 8, 0));
        }

        grid.clear_day(0);
        assert!(!grid.day_has_activity(0));
        assert!(grid.day_has_activity(4));

        grid.clear_all();
        assert_eq!(grid.count_active_quarters(), 0);
    }

    #[test]
    fn paint_gesture_stamps_while_dragging() {
        let mut grid = WeeklyGrid::new();
        let mut gesture = PaintGesture::default();

        gesture.press(&mut grid, 0, 10, 0);
        assert_eq!(gesture, PaintGesture::Dragging { paint: true });
        gesture.enter(&mut grid, 0, 10, 1);
        gesture.enter(&mut grid, 0, 10, 2);
        gesture.release();
        assert_eq!(gesture, PaintGesture::Idle);

        // Entering while idle paints nothing.
        gesture.enter(&mut grid, 0, 10, 3);

        assert!(grid.is_active(0, 10, 0));
        assert!(grid.is_active(0, 10, 1));
        assert!(grid.is_active(0, 10, 2));
        assert!(!grid.is_active(0, 10, 3));

        // Pressing an active cell starts an erasing drag.
        gesture.press(&mut grid, 0, 10, 0);
        assert_eq!(gesture, PaintGesture::Dragging { paint: false });
        gesture.enter(&mut grid, 0, 10, 1);
        assert!(!grid.is_active(0, 10, 0));
        assert!(!grid.is_active(0, 10, 1));
    }
}
