//! # Shift Commands
//!
//! A cashier opens a shift with the drawer's starting cash and closes it
//! with the counted cash. Closing records the shift's sales total and
//! transaction count. Every command acts on the signed-in user's own shifts.

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use partsdesk_core::shift::RECENT_SHIFT_LIMIT;
use partsdesk_core::{Money, Section, Session, Shift};

use crate::error::ApiError;
use crate::state::DbState;

/// A shift plus how long it has run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftView {
    #[serde(flatten)]
    pub shift: Shift,
    pub duration_hours: i64,
}

impl From<Shift> for ShiftView {
    fn from(shift: Shift) -> Self {
        ShiftView {
            duration_hours: shift.duration_hours(Utc::now()),
            shift,
        }
    }
}

pub async fn open_shift(
    db: &DbState,
    session: &Session,
    opening_cash: Money,
) -> Result<ShiftView, ApiError> {
    session.require(Section::Shift)?;

    let shift = db.inner().shifts().open(&session.user_id, opening_cash).await?;
    info!(shift_id = %shift.id, staff = %session.full_name, "open_shift command");
    Ok(shift.into())
}

pub async fn close_shift(
    db: &DbState,
    session: &Session,
    closing_cash: Money,
) -> Result<ShiftView, ApiError> {
    session.require(Section::Shift)?;

    let shift = db.inner().shifts().close(&session.user_id, closing_cash).await?;
    info!(shift_id = %shift.id, staff = %session.full_name, "close_shift command");
    Ok(shift.into())
}

/// The caller's open shift, or `None` when the drawer is closed.
pub async fn current_shift(db: &DbState, session: &Session) -> Result<Option<ShiftView>, ApiError> {
    session.require(Section::Shift)?;
    Ok(db
        .inner()
        .shifts()
        .current(&session.user_id)
        .await?
        .map(ShiftView::from))
}

pub async fn recent_shifts(db: &DbState, session: &Session) -> Result<Vec<ShiftView>, ApiError> {
    session.require(Section::Shift)?;
    let shifts = db
        .inner()
        .shifts()
        .recent(&session.user_id, RECENT_SHIFT_LIMIT)
        .await?;
    Ok(shifts.into_iter().map(ShiftView::from).collect())
}
