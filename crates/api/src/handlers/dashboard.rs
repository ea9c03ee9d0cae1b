//! Dashboard overview. Admins see every record; everyone else sees only
//! records filed under their own account.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use healthvitals_core::dashboard::{self, MetricAverages, RiskTally, Windows, AVERAGE_SAMPLE_LIMIT};
use healthvitals_core::health::health_score;
use healthvitals_core::roles::ROLE_ADMIN;
use healthvitals_core::types::Timestamp;
use healthvitals_core::vitals::VitalsSnapshot;
use healthvitals_db::repositories::vitals_repo::{VitalsFilter, VitalsGrouping};
use healthvitals_db::repositories::{FaceScanRepo, PatientRepo, UserRepo, VitalsRepo};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Totals {
    pub users: i64,
    pub patients: i64,
    pub vitals: i64,
    pub face_scans: i64,
}

#[derive(Debug, Serialize)]
pub struct Timeline {
    pub today: i64,
    pub this_week: i64,
    pub this_month: i64,
    /// Percent change from the seven days before this week.
    pub weekly_trend: f64,
}

#[derive(Debug, Serialize)]
pub struct RiskAssessment {
    pub diabetic: RiskTally,
    pub hypertension: RiskTally,
}

#[derive(Debug, Serialize)]
pub struct LatestReading {
    pub recorded_at: Timestamp,
    pub patient_name: String,
    pub heart_rate: Option<i32>,
    pub oxygen_saturation: Option<i32>,
    pub blood_pressure: Option<String>,
    pub source: String,
}

#[derive(Debug, Serialize)]
pub struct DashboardOverview {
    pub totals: Totals,
    pub vitals_timeline: Timeline,
    pub averages: MetricAverages,
    pub risk_assessment: RiskAssessment,
    /// Record count per `source` value.
    pub sources: BTreeMap<String, i64>,
    pub latest: Option<LatestReading>,
    pub health_score: u32,
    pub user_role: String,
}

/// GET /api/analytics
pub async fn overview(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<DashboardOverview>>> {
    let pool = &state.pool;
    let is_admin = auth_user.role == ROLE_ADMIN;
    let scope = VitalsFilter {
        user_id: (!is_admin).then_some(auth_user.user_id),
        ..Default::default()
    };
    let since = |from: Timestamp| VitalsFilter {
        from: Some(from),
        ..scope.clone()
    };
    let windows = Windows::ending(Utc::now());

    let users = async {
        if is_admin {
            UserRepo::count(pool).await
        } else {
            Ok(1)
        }
    };
    let face_scans = async {
        if is_admin {
            FaceScanRepo::count(pool).await
        } else {
            FaceScanRepo::count_for_user(pool, auth_user.user_id).await
        }
    };
    let owner = scope.user_id;
    let (users, patients, vitals, face_scans) = tokio::try_join!(
        users,
        PatientRepo::count(pool, owner),
        VitalsRepo::count(pool, &scope),
        face_scans,
    )?;

    let today_filter = since(windows.today);
    let week_filter = since(windows.week_start);
    let month_filter = since(windows.month_start);
    let since_previous_week = since(windows.previous_week_start);
    let (today, this_week, this_month, two_weeks) = tokio::try_join!(
        VitalsRepo::count(pool, &today_filter),
        VitalsRepo::count(pool, &week_filter),
        VitalsRepo::count(pool, &month_filter),
        VitalsRepo::count(pool, &since_previous_week),
    )?;

    let (recent, latest, diabetic, hypertension, sources) = tokio::try_join!(
        VitalsRepo::list(pool, &month_filter, AVERAGE_SAMPLE_LIMIT, 0),
        VitalsRepo::list_with_owner(pool, &scope, 1),
        VitalsRepo::tally(pool, &scope, VitalsGrouping::DiabeticRisk),
        VitalsRepo::tally(pool, &scope, VitalsGrouping::HypertensionRisk),
        VitalsRepo::tally(pool, &scope, VitalsGrouping::Source),
    )?;

    let recent: Vec<VitalsSnapshot> = recent.iter().map(VitalsSnapshot::from).collect();
    let latest = latest.into_iter().next();
    let score = health_score(latest.as_ref().map(|l| VitalsSnapshot::from(&l.vitals)).as_ref());

    let overview = DashboardOverview {
        totals: Totals {
            users,
            patients,
            vitals,
            face_scans,
        },
        vitals_timeline: Timeline {
            today,
            this_week,
            this_month,
            weekly_trend: dashboard::weekly_trend(this_week, two_weeks - this_week),
        },
        averages: dashboard::averages(&recent),
        risk_assessment: RiskAssessment {
            diabetic: tally_risks(&diabetic),
            hypertension: tally_risks(&hypertension),
        },
        sources: sources
            .into_iter()
            .filter_map(|(source, count)| Some((source?, count)))
            .collect(),
        latest: latest.map(|l| {
            let patient_name = match (l.patient_first_name, l.patient_last_name) {
                (Some(first), last) => format!("{first} {}", last.unwrap_or_default())
                    .trim()
                    .to_string(),
                (None, _) => "Unknown".to_string(),
            };
            let r = &l.vitals.reading;
            LatestReading {
                recorded_at: l.vitals.recorded_at,
                patient_name,
                heart_rate: r.heart_rate,
                oxygen_saturation: r.oxygen_saturation,
                blood_pressure: r.blood_pressure.clone(),
                source: l.vitals.source.clone(),
            }
        }),
        health_score: score,
        user_role: auth_user.role,
    };

    Ok(Json(DataResponse { data: overview }))
}

fn tally_risks(rows: &[(Option<String>, i64)]) -> RiskTally {
    let mut tally = RiskTally::default();
    for (label, count) in rows {
        if let Some(label) = label {
            tally.add(label, *count);
        }
    }
    tally
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_risk_labels_are_skipped() {
        let rows = vec![
            (Some("High".to_string()), 2),
            (None, 5),
            (Some("low".to_string()), 1),
        ];
        let tally = tally_risks(&rows);
        assert_eq!(tally.high, 2);
        assert_eq!(tally.low, 1);
        assert_eq!(tally.medium, 0);
    }
}
