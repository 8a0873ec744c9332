use tracing::{
  debug,
  error,
  trace
};

use crate::model::{
  CalendarDataCollection,
  CalendarInstance,
  CalendarItem,
  total_items
};
use crate::window::TimeWindow;

#[must_use]
pub fn item_overlaps(
  item: &CalendarItem,
  window: &TimeWindow
) -> bool {
  window.overlaps(
    item.start_date,
    item.end_date
  )
}

/// Keeps the items that overlap
/// `window`, then drops instances and
/// collections left without items.
/// Order is preserved.
#[tracing::instrument(
  skip_all,
  fields(window = %window)
)]
#[must_use]
pub fn filter_by_window(
  collections: &[CalendarDataCollection],
  window: &TimeWindow
) -> Vec<CalendarDataCollection> {
  let filtered: Vec<_> = collections
    .iter()
    .filter_map(|entry| {
      let calendar_data: Vec<_> = entry
        .calendar_data
        .iter()
        .filter_map(|instance| {
          filter_instance(
            instance, window
          )
        })
        .collect();

      if calendar_data.is_empty() {
        None
      } else {
        Some(CalendarDataCollection {
          calendar_data
        })
      }
    })
    .collect();

  debug!(
    before = total_items(collections),
    after = total_items(&filtered),
    collections = filtered.len(),
    "filtered calendar collections"
  );

  filtered
}

/// `None` is the "nothing to show"
/// signal: either no window was
/// supplied (logged as an error) or no
/// item overlapped it.
#[must_use]
pub fn filter_optional(
  collections: &[CalendarDataCollection],
  window: Option<&TimeWindow>
) -> Option<Vec<CalendarDataCollection>>
{
  let Some(window) = window else {
    error!(
      "no window supplied; calendar \
       output left unchanged"
    );
    return None;
  };

  let filtered =
    filter_by_window(collections, window);
  if filtered.is_empty() {
    debug!(
      %window,
      "no calendar items in window"
    );
    return None;
  }

  Some(filtered)
}

fn filter_instance(
  instance: &CalendarInstance,
  window: &TimeWindow
) -> Option<CalendarInstance> {
  let items: Vec<CalendarItem> = instance
    .items
    .iter()
    .filter(|item| {
      item_overlaps(item, window)
    })
    .cloned()
    .collect();

  if items.is_empty() {
    trace!(
      banner = %instance.banner,
      "dropping instance with no items \
       in window"
    );
    return None;
  }

  Some(CalendarInstance {
    banner: instance.banner.clone(),
    items
  })
}
