//! Booking date-range conflict detection.
//!
//! Ranges are closed on both ends at day granularity: a booking that ends on
//! the day another starts overlaps it.

use chrono::NaiveDate;
use staybnb_db::RecordId;

use super::models::Booking;

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// `None` when `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        !(self.end < other.start || self.start > other.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictResult {
    NoConflict,
    Conflict { conflicting_booking_ids: Vec<RecordId> },
}

impl ConflictResult {
    pub fn is_conflict(&self) -> bool {
        matches!(self, ConflictResult::Conflict { .. })
    }
}

/// Decide whether `proposed` overlaps any booking of `spot_id` in `existing`.
///
/// Bookings of other spots are ignored. Conflicting ids are reported in the
/// order they were supplied.
pub fn check_conflict<'a, I>(spot_id: RecordId, proposed: DateRange, existing: I) -> ConflictResult
where
    I: IntoIterator<Item = &'a Booking>,
{
    let conflicting_booking_ids: Vec<RecordId> = existing
        .into_iter()
        .filter(|booking| booking.spot_id == spot_id && booking.range().overlaps(&proposed))
        .map(|booking| booking.id)
        .collect();

    if conflicting_booking_ids.is_empty() {
        ConflictResult::NoConflict
    } else {
        ConflictResult::Conflict {
            conflicting_booking_ids,
        }
    }
}

/// Request field that collides with an existing booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    StartDate,
    EndDate,
}

impl DateField {
    pub fn as_str(self) -> &'static str {
        match self {
            DateField::StartDate => "startDate",
            DateField::EndDate => "endDate",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            DateField::StartDate => "Start date conflicts with an existing booking",
            DateField::EndDate => "End date conflicts with an existing booking",
        }
    }
}

/// One existing booking the proposed range runs into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateConflict {
    pub booking_id: RecordId,
    pub fields: Vec<DateField>,
}

/// Attribute an overlap with `existing` to the request's date fields.
///
/// A proposed range that swallows the existing booking without either
/// endpoint landing inside it blames both fields.
pub fn conflicting_fields(proposed: DateRange, existing: &Booking) -> DateConflict {
    let range = existing.range();
    let mut fields = Vec::with_capacity(2);

    if range.contains(proposed.start) {
        fields.push(DateField::StartDate);
    }
    if range.contains(proposed.end) {
        fields.push(DateField::EndDate);
    }
    if fields.is_empty() && range.overlaps(&proposed) {
        fields.extend([DateField::StartDate, DateField::EndDate]);
    }

    DateConflict {
        booking_id: existing.id,
        fields,
    }
}
