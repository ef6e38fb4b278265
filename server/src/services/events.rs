use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::models::event::start_instant;
use crate::models::{Event, EventChanges, EventWithTickets, NewEvent};
use crate::store::Store;
use crate::utils::{AppError, FieldError};

const MAX_TITLE_LEN: usize = 200;
const MAX_DESCRIPTION_LEN: usize = 2000;
const MAX_LOCATION_LEN: usize = 200;

const TITLE: (&str, &str) = ("title", "Title");
const DESCRIPTION: (&str, &str) = ("description", "Description");
const LOCATION: (&str, &str) = ("location", "Location");

pub const FUTURE_DATE_MESSAGE: &str = "Date must be a valid future date";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: Option<String>,
    pub location: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

fn check_text(
    errors: &mut Vec<FieldError>,
    (field, label): (&'static str, &str),
    value: &str,
    required: bool,
    max: usize,
) {
    let len = value.trim().chars().count();
    if required && len == 0 {
        errors.push(FieldError::new(field, format!("{label} is required")));
    } else if len > max {
        errors.push(FieldError::new(
            field,
            format!("{label} must be at most {max} characters"),
        ));
    }
}

/// Checks the schedule fields. `None` means the field was rejected and an
/// error has been recorded.
fn check_schedule(
    errors: &mut Vec<FieldError>,
    date: &str,
    time: Option<&str>,
    now: DateTime<Utc>,
) -> Option<(NaiveDate, Option<NaiveTime>)> {
    let time = match time.map(str::trim).filter(|t| !t.is_empty()) {
        Some(raw) => match parse_time(raw) {
            Some(t) => Some(t),
            None => {
                errors.push(FieldError::new("time", "Time must be formatted as HH:MM"));
                return None;
            }
        },
        None => None,
    };

    match parse_date(date) {
        Some(date) if start_instant(date, time) > now => Some((date, time)),
        _ => {
            errors.push(FieldError::new("date", FUTURE_DATE_MESSAGE));
            None
        }
    }
}

pub fn validate_new_event(
    req: &CreateEventRequest,
    organizer_id: Uuid,
    now: DateTime<Utc>,
) -> Result<NewEvent, AppError> {
    let mut errors = Vec::new();
    check_text(&mut errors, TITLE, &req.title, true, MAX_TITLE_LEN);
    check_text(&mut errors, DESCRIPTION, &req.description, false, MAX_DESCRIPTION_LEN);
    check_text(&mut errors, LOCATION, &req.location, true, MAX_LOCATION_LEN);
    let schedule = check_schedule(&mut errors, &req.date, req.time.as_deref(), now);

    match schedule {
        Some((date, time)) if errors.is_empty() => Ok(NewEvent {
            organizer_id,
            title: req.title.trim().to_string(),
            description: req.description.trim().to_string(),
            date,
            time,
            location: req.location.trim().to_string(),
        }),
        _ => Err(AppError::InvalidFields(errors)),
    }
}

/// Merges a partial update onto the stored event. The schedule is only
/// re-checked when the request touches the date or time, so an event that
/// has already started can still have its description corrected.
pub fn merge_changes(
    event: &Event,
    req: &UpdateEventRequest,
    now: DateTime<Utc>,
) -> Result<EventChanges, AppError> {
    let mut errors = Vec::new();

    let title = req.title.as_deref().unwrap_or(&event.title);
    let description = req.description.as_deref().unwrap_or(&event.description);
    let location = req.location.as_deref().unwrap_or(&event.location);
    check_text(&mut errors, TITLE, title, true, MAX_TITLE_LEN);
    check_text(&mut errors, DESCRIPTION, description, false, MAX_DESCRIPTION_LEN);
    check_text(&mut errors, LOCATION, location, true, MAX_LOCATION_LEN);

    let (date, time) = if req.date.is_some() || req.time.is_some() {
        let date = req
            .date
            .clone()
            .unwrap_or_else(|| event.date.format("%Y-%m-%d").to_string());
        let time = match &req.time {
            Some(raw) => Some(raw.clone()),
            None => event.time.map(|t| t.format("%H:%M:%S").to_string()),
        };
        check_schedule(&mut errors, &date, time.as_deref(), now)
            .unwrap_or((event.date, event.time))
    } else {
        (event.date, event.time)
    };

    if !errors.is_empty() {
        return Err(AppError::InvalidFields(errors));
    }

    Ok(EventChanges {
        title: title.trim().to_string(),
        description: description.trim().to_string(),
        date,
        time,
        location: location.trim().to_string(),
    })
}

/// Loads an event the acting organizer owns. Missing events are 404; events
/// owned by someone else are 403.
pub async fn owned_event(
    store: &dyn Store,
    event_id: Uuid,
    user: &AuthUser,
) -> Result<Event, AppError> {
    let event = store
        .get_event(event_id)
        .await?
        .ok_or_else(|| AppError::not_found("Event"))?;
    if !event.is_owned_by(user.user_id) {
        return Err(AppError::Forbidden(
            "You do not own this event".to_string(),
        ));
    }
    Ok(event)
}

pub async fn list_events(store: &dyn Store) -> Result<Vec<Event>, AppError> {
    Ok(store.list_events().await?)
}

pub async fn get_event(store: &dyn Store, event_id: Uuid) -> Result<EventWithTickets, AppError> {
    let event = store
        .get_event(event_id)
        .await?
        .ok_or_else(|| AppError::not_found("Event"))?;
    let tickets = store.list_tickets(event_id).await?;
    Ok(EventWithTickets { event, tickets })
}

pub async fn create_event(
    store: &dyn Store,
    organizer: &AuthUser,
    req: CreateEventRequest,
) -> Result<Event, AppError> {
    let new_event = validate_new_event(&req, organizer.user_id, Utc::now())?;
    let event = store.create_event(new_event).await?;
    tracing::info!(event_id = %event.id, organizer_id = %organizer.user_id, "Event created");
    Ok(event)
}

pub async fn update_event(
    store: &dyn Store,
    organizer: &AuthUser,
    event_id: Uuid,
    req: UpdateEventRequest,
) -> Result<Event, AppError> {
    let event = owned_event(store, event_id, organizer).await?;
    let changes = merge_changes(&event, &req, Utc::now())?;

    let updated = store
        .update_event(event_id, organizer.user_id, changes)
        .await?
        .ok_or_else(|| AppError::not_found("Event"))?;
    tracing::info!(event_id = %event_id, "Event updated");
    Ok(updated)
}

pub async fn delete_event(
    store: &dyn Store,
    organizer: &AuthUser,
    event_id: Uuid,
) -> Result<(), AppError> {
    owned_event(store, event_id, organizer).await?;
    if !store.delete_event(event_id, organizer.user_id).await? {
        return Err(AppError::not_found("Event"));
    }
    tracing::info!(event_id = %event_id, "Event deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap()
    }

    fn request(date: &str, time: Option<&str>) -> CreateEventRequest {
        CreateEventRequest {
            title: " RustConf ".to_string(),
            description: "Talks and workshops".to_string(),
            date: date.to_string(),
            time: time.map(str::to_string),
            location: "Portland".to_string(),
        }
    }

    fn only_message(err: AppError) -> String {
        match err {
            AppError::InvalidFields(fields) => {
                assert_eq!(fields.len(), 1, "{fields:?}");
                fields[0].message.clone()
            }
            other => panic!("expected field errors, got {other:?}"),
        }
    }

    #[test]
    fn test_future_event_is_accepted() {
        let event = validate_new_event(&request("2030-06-02", Some("09:30")), Uuid::nil(), now())
            .unwrap();
        assert_eq!(event.title, "RustConf");
        assert_eq!(event.time, NaiveTime::from_hms_opt(9, 30, 0));
    }

    #[test]
    fn test_past_date_is_rejected() {
        let err = validate_new_event(&request("2020-01-01", None), Uuid::nil(), now())
            .err()
            .unwrap();
        assert_eq!(only_message(err), FUTURE_DATE_MESSAGE);
    }

    #[test]
    fn test_earlier_today_is_rejected() {
        let err = validate_new_event(&request("2030-06-01", Some("11:59")), Uuid::nil(), now())
            .err()
            .unwrap();
        assert_eq!(only_message(err), FUTURE_DATE_MESSAGE);

        assert!(
            validate_new_event(&request("2030-06-01", Some("12:01")), Uuid::nil(), now()).is_ok()
        );
    }

    #[test]
    fn test_unparseable_date_is_rejected() {
        let err = validate_new_event(&request("next friday", None), Uuid::nil(), now())
            .err()
            .unwrap();
        assert_eq!(only_message(err), FUTURE_DATE_MESSAGE);
    }

    #[test]
    fn test_bad_time_format() {
        let err = validate_new_event(&request("2030-07-01", Some("7pm")), Uuid::nil(), now())
            .err()
            .unwrap();
        assert_eq!(only_message(err), "Time must be formatted as HH:MM");
    }

    #[test]
    fn test_missing_title_and_location() {
        let mut req = request("2030-07-01", None);
        req.title = String::new();
        req.location = "  ".to_string();
        match validate_new_event(&req, Uuid::nil(), now()).err().unwrap() {
            AppError::InvalidFields(fields) => {
                let names: Vec<_> = fields.iter().map(|f| f.field).collect();
                assert_eq!(names, vec!["title", "location"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    fn stored_event() -> Event {
        Event {
            id: Uuid::new_v4(),
            organizer_id: Uuid::new_v4(),
            title: "Launch party".to_string(),
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2030, 5, 1).unwrap(),
            time: None,
            location: "Rooftop".to_string(),
            created_at: now(),
            updated_at: now(),
        }
    }

    #[test]
    fn test_merge_keeps_unchanged_fields() {
        // Already in the past relative to now(), but the schedule is untouched
        let event = stored_event();
        let req = UpdateEventRequest {
            description: Some("Bring snacks".to_string()),
            ..Default::default()
        };
        let changes = merge_changes(&event, &req, now()).unwrap();
        assert_eq!(changes.title, "Launch party");
        assert_eq!(changes.description, "Bring snacks");
        assert_eq!(changes.date, event.date);
    }

    #[test]
    fn test_merge_rechecks_new_date() {
        let event = stored_event();
        let req = UpdateEventRequest {
            date: Some("2029-12-31".to_string()),
            ..Default::default()
        };
        let err = merge_changes(&event, &req, now()).err().unwrap();
        assert_eq!(only_message(err), FUTURE_DATE_MESSAGE);

        let req = UpdateEventRequest {
            date: Some("2031-01-15".to_string()),
            time: Some("19:00".to_string()),
            ..Default::default()
        };
        let changes = merge_changes(&event, &req, now()).unwrap();
        assert_eq!(changes.date, NaiveDate::from_ymd_opt(2031, 1, 15).unwrap());
        assert_eq!(changes.time, NaiveTime::from_hms_opt(19, 0, 0));
    }
}
