//! Read-only request views: kanban board, preventive calendar, overdue list and pivot counts.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::{maintenance_request, maintenance_team, EquipmentCategory, RequestStatus, RequestType};

use crate::errors::ServiceError;
use crate::request_service::{hydrate, RequestView};

#[derive(Debug, Clone, Serialize)]
pub struct KanbanColumn {
    pub status: RequestStatus,
    pub count: usize,
    pub requests: Vec<RequestView>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TeamCount {
    pub team_id: Uuid,
    pub team_name: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Count<K> {
    pub key: K,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PivotReport {
    pub total: u64,
    pub by_team: Vec<TeamCount>,
    pub by_category: Vec<Count<String>>,
    pub by_status: Vec<Count<String>>,
    pub by_type: Vec<Count<String>>,
}

/// One column per status in workflow order, newest request first.
pub async fn kanban(db: &DatabaseConnection) -> Result<Vec<KanbanColumn>, ServiceError> {
    let items = maintenance_request::Entity::find()
        .order_by_desc(maintenance_request::Column::CreatedAt)
        .all(db)
        .await?;
    let views = hydrate(db, items).await?;
    let mut columns: Vec<KanbanColumn> = RequestStatus::ALL
        .iter()
        .map(|s| KanbanColumn { status: *s, count: 0, requests: Vec::new() })
        .collect();
    for view in views {
        if let Some(col) = columns.iter_mut().find(|c| c.status.as_str() == view.request.status) {
            col.requests.push(view);
        }
    }
    for col in &mut columns {
        col.count = col.requests.len();
    }
    Ok(columns)
}

/// Accepts RFC 3339 or a bare `YYYY-MM-DD`; a bare end date covers the whole day.
fn parse_bound(field: &str, raw: Option<&str>, end_of_day: bool) -> Result<DateTime<Utc>, ServiceError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServiceError::Validation("startDate and endDate are required".into()))?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ServiceError::Validation(format!("{field} must be an ISO date")))?;
    let time = if end_of_day {
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)
    }
    .ok_or_else(|| ServiceError::Validation(format!("{field} must be an ISO date")))?;
    Ok(date.and_time(time).and_utc())
}

pub fn calendar_range(query: &CalendarQuery) -> Result<(DateTime<Utc>, DateTime<Utc>), ServiceError> {
    let start = parse_bound("startDate", query.start_date.as_deref(), false)?;
    let end = parse_bound("endDate", query.end_date.as_deref(), true)?;
    if start > end {
        return Err(ServiceError::Validation("startDate must not be after endDate".into()));
    }
    Ok((start, end))
}

/// Preventive requests scheduled inside the range, earliest first.
pub async fn calendar(db: &DatabaseConnection, query: CalendarQuery) -> Result<Vec<RequestView>, ServiceError> {
    use maintenance_request::Column;
    let (start, end) = calendar_range(&query)?;
    let items = maintenance_request::Entity::find()
        .filter(Column::RequestType.eq(RequestType::Preventive.as_str()))
        .filter(Column::ScheduledDate.gte(start))
        .filter(Column::ScheduledDate.lte(end))
        .order_by_asc(Column::ScheduledDate)
        .all(db)
        .await?;
    hydrate(db, items).await
}

/// Open requests whose scheduled date has passed.
pub async fn overdue(db: &DatabaseConnection) -> Result<Vec<RequestView>, ServiceError> {
    use maintenance_request::Column;
    let open: Vec<&str> = RequestStatus::open().iter().map(|s| s.as_str()).collect();
    let items = maintenance_request::Entity::find()
        .filter(Column::ScheduledDate.lt(Utc::now()))
        .filter(Column::Status.is_in(open))
        .order_by_asc(Column::ScheduledDate)
        .all(db)
        .await?;
    hydrate(db, items).await
}

fn tally<'a>(keys: &[&'static str], values: impl Iterator<Item = &'a str>) -> Vec<Count<String>> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for v in values {
        *counts.entry(v).or_default() += 1;
    }
    keys.iter()
        .map(|k| Count { key: k.to_string(), count: counts.get(k).copied().unwrap_or(0) })
        .collect()
}

pub async fn pivot(db: &DatabaseConnection) -> Result<PivotReport, ServiceError> {
    let items = maintenance_request::Entity::find().all(db).await?;
    let teams = maintenance_team::Entity::find()
        .order_by_asc(maintenance_team::Column::Name)
        .all(db)
        .await?;

    let by_team = teams
        .into_iter()
        .map(|t| TeamCount {
            count: items.iter().filter(|r| r.team_id == t.id).count() as u64,
            team_id: t.id,
            team_name: t.name,
        })
        .collect();
    let categories: Vec<&str> = EquipmentCategory::ALL.iter().map(|c| c.as_str()).collect();
    let statuses: Vec<&str> = RequestStatus::ALL.iter().map(|s| s.as_str()).collect();
    let types: Vec<&str> = RequestType::ALL.iter().map(|t| t.as_str()).collect();

    Ok(PivotReport {
        total: items.len() as u64,
        by_team,
        by_category: tally(&categories, items.iter().map(|r| r.category.as_str())),
        by_status: tally(&statuses, items.iter().map(|r| r.status.as_str())),
        by_type: tally(&types, items.iter().map(|r| r.request_type.as_str())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use models::Role;
    use crate::request_service::{self, CreateRequest};
    use crate::test_support::{actor_of, get_db, seed_equipment, seed_team, seed_user};

    #[test]
    fn calendar_bounds_are_required_and_ordered() {
        let missing = CalendarQuery { start_date: Some("2024-01-01".into()), end_date: None };
        assert!(matches!(calendar_range(&missing), Err(ServiceError::Validation(_))));

        let reversed = CalendarQuery { start_date: Some("2024-02-01".into()), end_date: Some("2024-01-01".into()) };
        assert!(calendar_range(&reversed).is_err());

        let day = CalendarQuery { start_date: Some("2024-01-01".into()), end_date: Some("2024-01-01".into()) };
        let (start, end) = calendar_range(&day).unwrap();
        assert!(end > start);
        assert_eq!(end.date_naive(), start.date_naive());

        let rfc = CalendarQuery {
            start_date: Some("2024-01-01T00:00:00Z".into()),
            end_date: Some("2024-01-31T12:00:00+02:00".into()),
        };
        assert!(calendar_range(&rfc).is_ok());
        let garbage = CalendarQuery { start_date: Some("yesterday".into()), end_date: Some("2024-01-01".into()) };
        assert!(calendar_range(&garbage).is_err());
    }

    #[tokio::test]
    async fn views_over_seeded_requests() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let team = seed_team(&db, "Mechanics").await?;
        seed_team(&db, "Idle").await?;
        let eq = seed_equipment(&db, team.id, "P-1", None).await?;
        let admin = actor_of(&seed_user(&db, "admin@example.com", Role::Admin, None).await?);

        let now = Utc::now();
        let mk = |subject: &str, kind: RequestType, scheduled: Option<DateTime<Utc>>| CreateRequest {
            subject: subject.into(),
            description: None,
            request_type: kind,
            priority: None,
            equipment_id: eq.id,
            scheduled_date: scheduled,
        };
        let late = request_service::create(&db, &admin, mk("Late service", RequestType::Preventive, Some(now - Duration::days(2)))).await?;
        request_service::create(&db, &admin, mk("Next week", RequestType::Preventive, Some(now + Duration::days(7)))).await?;
        let fix = request_service::create(&db, &admin, mk("Broken", RequestType::Corrective, Some(now - Duration::days(1)))).await?;
        request_service::start(&db, &admin, fix.request.id).await?;

        let board = kanban(&db).await?;
        let order: Vec<_> = board.iter().map(|c| c.status).collect();
        assert_eq!(order, RequestStatus::ALL.to_vec());
        assert_eq!(board[0].count, 2);
        assert_eq!(board[1].count, 1);
        assert_eq!(board[2].count + board[3].count, 0);

        let cal = calendar(&db, CalendarQuery {
            start_date: Some((now - Duration::days(3)).to_rfc3339()),
            end_date: Some((now + Duration::days(3)).to_rfc3339()),
        })
        .await?;
        assert_eq!(cal.len(), 1);
        assert_eq!(cal[0].request.id, late.request.id);

        let late_list = overdue(&db).await?;
        assert_eq!(late_list.len(), 2);
        assert_eq!(late_list[0].request.id, late.request.id);

        let report = pivot(&db).await?;
        assert_eq!(report.total, 3);
        assert_eq!(report.by_team.len(), 2);
        assert_eq!(report.by_team.iter().find(|t| t.team_name == "Mechanics").map(|t| t.count), Some(3));
        assert_eq!(report.by_type.iter().find(|c| c.key == "PREVENTIVE").map(|c| c.count), Some(2));
        assert_eq!(report.by_status.iter().find(|c| c.key == "IN_PROGRESS").map(|c| c.count), Some(1));
        assert_eq!(report.by_category.iter().find(|c| c.key == "MACHINERY").map(|c| c.count), Some(3));
        Ok(())
    }
}
