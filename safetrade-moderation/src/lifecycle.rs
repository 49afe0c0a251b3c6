//! Incident lifecycle rules.
//!
//! Every decision about what an incident may do next lives here, away from
//! the HTTP handlers and the database. The handlers load the current row,
//! ask this module for a verdict, and apply it with a conditional UPDATE so
//! that two racing writers cannot both win the same slot.
//!
//! An incident moves PENDING -> ACCEPTED | REJECTED, and an accepted
//! incident whose listing is suspended may be appealed once, moving it to
//! APPEALED for a second review by a different moderator. The review phase
//! is `Appeal` exactly when an appeal moderator has been recorded; that is
//! what turns an accepted verdict into a permanent ban instead of a
//! suspension.

use uuid::Uuid;

use safetrade_shared::errors::{AppError, AppResult, ErrorCode};
use safetrade_shared::types::ProductStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncidentStatus {
    Pending,
    Accepted,
    Rejected,
    Appealed,
}

impl std::fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            IncidentStatus::Pending => "pending",
            IncidentStatus::Accepted => "accepted",
            IncidentStatus::Rejected => "rejected",
            IncidentStatus::Appealed => "appealed",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for IncidentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(IncidentStatus::Pending),
            "accepted" => Ok(IncidentStatus::Accepted),
            "rejected" => Ok(IncidentStatus::Rejected),
            "appealed" => Ok(IncidentStatus::Appealed),
            _ => Err(format!("unknown incident status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncidentType {
    Dangerous,
    Fraud,
    Inappropriate,
    Other,
}

impl std::fmt::Display for IncidentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            IncidentType::Dangerous => "dangerous",
            IncidentType::Fraud => "fraud",
            IncidentType::Inappropriate => "inappropriate",
            IncidentType::Other => "other",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for IncidentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dangerous" => Ok(IncidentType::Dangerous),
            "fraud" => Ok(IncidentType::Fraud),
            "inappropriate" => Ok(IncidentType::Inappropriate),
            "other" => Ok(IncidentType::Other),
            _ => Err(format!("unknown incident type: {s}")),
        }
    }
}

/// A moderator's final ruling on an incident. The same two values close
/// both the initial review and the post-appeal review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionVerdict {
    Accepted,
    Rejected,
}

impl ResolutionVerdict {
    pub fn incident_status(&self) -> IncidentStatus {
        match self {
            ResolutionVerdict::Accepted => IncidentStatus::Accepted,
            ResolutionVerdict::Rejected => IncidentStatus::Rejected,
        }
    }
}

impl std::str::FromStr for ResolutionVerdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "accepted" => Ok(ResolutionVerdict::Accepted),
            "rejected" => Ok(ResolutionVerdict::Rejected),
            _ => Err(format!("unknown resolution verdict: {s}")),
        }
    }
}

/// Which review an incident is in. `Appeal` exactly when an appeal
/// moderator has been recorded on the incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewPhase {
    Initial,
    Appeal,
}

pub fn review_phase(appeal_moderator_id: Option<Uuid>) -> ReviewPhase {
    match appeal_moderator_id {
        Some(_) => ReviewPhase::Appeal,
        None => ReviewPhase::Initial,
    }
}

/// The product status a resolution drives the listing to.
///
/// Accepting in the initial review suspends the listing (the owner may
/// still appeal); accepting after an appeal bans it for good; a rejection
/// restores the listing regardless of phase.
pub fn resolved_product_status(verdict: ResolutionVerdict, phase: ReviewPhase) -> ProductStatus {
    match (verdict, phase) {
        (ResolutionVerdict::Accepted, ReviewPhase::Initial) => ProductStatus::Suspended,
        (ResolutionVerdict::Accepted, ReviewPhase::Appeal) => ProductStatus::Banned,
        (ResolutionVerdict::Rejected, _) => ProductStatus::Active,
    }
}

/// The assignment slot an `assign moderator` call would fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentSlot {
    Initial,
    Appeal,
}

/// The assignment-relevant view of an incident row.
#[derive(Debug, Clone, Copy)]
pub struct AssignmentView {
    pub status: IncidentStatus,
    pub moderator_id: Option<Uuid>,
    pub appeal_moderator_id: Option<Uuid>,
}

/// Decide which slot `candidate` may take on an incident, if any.
///
/// A pending incident takes one moderator; an appealed incident takes one
/// appeal moderator who must not be the moderator that issued the original
/// ruling. Every other status refuses assignment.
pub fn assignment_slot(view: &AssignmentView, candidate: Uuid) -> AppResult<AssignmentSlot> {
    match view.status {
        IncidentStatus::Appealed => {
            if view.moderator_id == Some(candidate) {
                return Err(AppError::new(
                    ErrorCode::SelfReviewConflict,
                    "original moderator cannot handle the appeal",
                ));
            }
            if view.appeal_moderator_id.is_some() {
                return Err(AppError::new(
                    ErrorCode::AlreadyAssigned,
                    "appeal already assigned to a moderator",
                ));
            }
            Ok(AssignmentSlot::Appeal)
        }
        IncidentStatus::Pending => {
            if view.moderator_id.is_some() {
                return Err(AppError::new(
                    ErrorCode::AlreadyAssigned,
                    "incident already assigned to a moderator",
                ));
            }
            Ok(AssignmentSlot::Initial)
        }
        IncidentStatus::Accepted | IncidentStatus::Rejected => Err(AppError::new(
            ErrorCode::InvalidIncidentState,
            "incident not in a valid state for assignment",
        )),
    }
}

/// Check that an incident may be appealed: the listing must currently be
/// suspended and no appeal may have been filed yet.
pub fn check_appeal(product_status: ProductStatus, appeal_reason: Option<&str>) -> AppResult<()> {
    if product_status != ProductStatus::Suspended {
        return Err(AppError::new(
            ErrorCode::AppealNotAllowed,
            "listing is not suspended, there is nothing to appeal",
        ));
    }
    if appeal_reason.is_some() {
        return Err(AppError::new(
            ErrorCode::AppealAlreadySubmitted,
            "an appeal has already been submitted for this incident",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(err: AppError) -> ErrorCode {
        match err {
            AppError::Known { code, .. } => code,
            other => panic!("expected a known error, got {other:?}"),
        }
    }

    fn pending() -> AssignmentView {
        AssignmentView {
            status: IncidentStatus::Pending,
            moderator_id: None,
            appeal_moderator_id: None,
        }
    }

    #[test]
    fn pending_incident_takes_first_moderator() {
        let slot = assignment_slot(&pending(), Uuid::now_v7()).unwrap();
        assert_eq!(slot, AssignmentSlot::Initial);
    }

    #[test]
    fn pending_incident_refuses_second_moderator() {
        let view = AssignmentView {
            moderator_id: Some(Uuid::now_v7()),
            ..pending()
        };
        // Whoever the candidate is, even the moderator already holding the slot.
        let err = assignment_slot(&view, Uuid::now_v7()).unwrap_err();
        assert_eq!(code(err), ErrorCode::AlreadyAssigned);
        let err = assignment_slot(&view, view.moderator_id.unwrap()).unwrap_err();
        assert_eq!(code(err), ErrorCode::AlreadyAssigned);
    }

    #[test]
    fn appeal_refuses_original_moderator() {
        let m1 = Uuid::now_v7();
        let view = AssignmentView {
            status: IncidentStatus::Appealed,
            moderator_id: Some(m1),
            appeal_moderator_id: None,
        };
        let err = assignment_slot(&view, m1).unwrap_err();
        assert_eq!(code(err), ErrorCode::SelfReviewConflict);
    }

    #[test]
    fn appeal_accepts_a_different_moderator() {
        let view = AssignmentView {
            status: IncidentStatus::Appealed,
            moderator_id: Some(Uuid::now_v7()),
            appeal_moderator_id: None,
        };
        let slot = assignment_slot(&view, Uuid::now_v7()).unwrap();
        assert_eq!(slot, AssignmentSlot::Appeal);
    }

    #[test]
    fn appeal_slot_is_single_use() {
        let view = AssignmentView {
            status: IncidentStatus::Appealed,
            moderator_id: Some(Uuid::now_v7()),
            appeal_moderator_id: Some(Uuid::now_v7()),
        };
        let err = assignment_slot(&view, Uuid::now_v7()).unwrap_err();
        assert_eq!(code(err), ErrorCode::AlreadyAssigned);
    }

    #[test]
    fn resolved_incidents_refuse_assignment() {
        for status in [IncidentStatus::Accepted, IncidentStatus::Rejected] {
            let view = AssignmentView { status, ..pending() };
            let err = assignment_slot(&view, Uuid::now_v7()).unwrap_err();
            assert_eq!(code(err), ErrorCode::InvalidIncidentState);
        }
    }

    #[test]
    fn resolution_matrix() {
        assert_eq!(
            resolved_product_status(ResolutionVerdict::Accepted, ReviewPhase::Initial),
            ProductStatus::Suspended
        );
        assert_eq!(
            resolved_product_status(ResolutionVerdict::Accepted, ReviewPhase::Appeal),
            ProductStatus::Banned
        );
        assert_eq!(
            resolved_product_status(ResolutionVerdict::Rejected, ReviewPhase::Initial),
            ProductStatus::Active
        );
        assert_eq!(
            resolved_product_status(ResolutionVerdict::Rejected, ReviewPhase::Appeal),
            ProductStatus::Active
        );
    }

    #[test]
    fn phase_follows_appeal_moderator_presence() {
        assert_eq!(review_phase(None), ReviewPhase::Initial);
        assert_eq!(review_phase(Some(Uuid::now_v7())), ReviewPhase::Appeal);
    }

    #[test]
    fn appeal_requires_suspended_listing() {
        for status in [
            ProductStatus::Active,
            ProductStatus::Reported,
            ProductStatus::Banned,
            ProductStatus::Deleted,
            ProductStatus::Deactivated,
        ] {
            let err = check_appeal(status, None).unwrap_err();
            assert_eq!(code(err), ErrorCode::AppealNotAllowed, "status {status}");
        }
        assert!(check_appeal(ProductStatus::Suspended, None).is_ok());
    }

    #[test]
    fn appeal_is_single_use() {
        let err = check_appeal(ProductStatus::Suspended, Some("mislabeled")).unwrap_err();
        assert_eq!(code(err), ErrorCode::AppealAlreadySubmitted);
    }

    #[test]
    fn verdict_parsing() {
        assert_eq!("accepted".parse::<ResolutionVerdict>().unwrap(), ResolutionVerdict::Accepted);
        assert_eq!("REJECTED".parse::<ResolutionVerdict>().unwrap(), ResolutionVerdict::Rejected);
        assert!("pending".parse::<ResolutionVerdict>().is_err());
        assert!("appealed".parse::<ResolutionVerdict>().is_err());
    }

    #[test]
    fn incident_vocabulary_round_trips() {
        for status in [
            IncidentStatus::Pending,
            IncidentStatus::Accepted,
            IncidentStatus::Rejected,
            IncidentStatus::Appealed,
        ] {
            assert_eq!(status.to_string().parse::<IncidentStatus>().unwrap(), status);
        }
        for kind in [
            IncidentType::Dangerous,
            IncidentType::Fraud,
            IncidentType::Inappropriate,
            IncidentType::Other,
        ] {
            assert_eq!(kind.to_string().parse::<IncidentType>().unwrap(), kind);
        }
    }

    // A miniature in-memory incident/listing pair that drives the lifecycle
    // the same way the handlers do, for whole-scenario coverage.
    struct Case {
        product: ProductStatus,
        status: IncidentStatus,
        moderator_id: Option<Uuid>,
        appeal_moderator_id: Option<Uuid>,
        appeal_reason: Option<String>,
    }

    impl Case {
        fn reported() -> Self {
            Self {
                product: ProductStatus::Reported,
                status: IncidentStatus::Pending,
                moderator_id: None,
                appeal_moderator_id: None,
                appeal_reason: None,
            }
        }

        fn view(&self) -> AssignmentView {
            AssignmentView {
                status: self.status,
                moderator_id: self.moderator_id,
                appeal_moderator_id: self.appeal_moderator_id,
            }
        }

        fn assign(&mut self, moderator: Uuid) -> AppResult<()> {
            match assignment_slot(&self.view(), moderator)? {
                AssignmentSlot::Initial => self.moderator_id = Some(moderator),
                AssignmentSlot::Appeal => self.appeal_moderator_id = Some(moderator),
            }
            Ok(())
        }

        fn resolve(&mut self, verdict: ResolutionVerdict) {
            let phase = review_phase(self.appeal_moderator_id);
            self.product = resolved_product_status(verdict, phase);
            self.status = verdict.incident_status();
        }

        fn appeal(&mut self, reason: &str) -> AppResult<()> {
            check_appeal(self.product, self.appeal_reason.as_deref())?;
            self.status = IncidentStatus::Appealed;
            self.appeal_reason = Some(reason.to_string());
            Ok(())
        }
    }

    #[test]
    fn full_appeal_scenario_ends_in_ban() {
        let m1 = Uuid::now_v7();
        let m2 = Uuid::now_v7();
        let mut case = Case::reported();

        case.assign(m1).unwrap();
        case.resolve(ResolutionVerdict::Accepted);
        assert_eq!(case.product, ProductStatus::Suspended);

        case.appeal("mislabeled").unwrap();
        assert_eq!(case.status, IncidentStatus::Appealed);
        assert_eq!(case.appeal_reason.as_deref(), Some("mislabeled"));

        // The original moderator is locked out of the appeal.
        assert_eq!(code(case.assign(m1).unwrap_err()), ErrorCode::SelfReviewConflict);

        case.assign(m2).unwrap();
        assert_eq!(case.appeal_moderator_id, Some(m2));

        case.resolve(ResolutionVerdict::Accepted);
        assert_eq!(case.product, ProductStatus::Banned);
        assert_eq!(case.status, IncidentStatus::Accepted);
    }

    #[test]
    fn rejected_report_restores_listing_and_blocks_appeal() {
        let mut case = Case::reported();
        case.assign(Uuid::now_v7()).unwrap();
        case.resolve(ResolutionVerdict::Rejected);

        assert_eq!(case.product, ProductStatus::Active);
        assert_eq!(case.status, IncidentStatus::Rejected);

        // Nothing to appeal: the listing is not suspended.
        assert_eq!(code(case.appeal("unfair").unwrap_err()), ErrorCode::AppealNotAllowed);
    }

    #[test]
    fn appeal_rejected_restores_listing() {
        let mut case = Case::reported();
        case.assign(Uuid::now_v7()).unwrap();
        case.resolve(ResolutionVerdict::Accepted);
        case.appeal("wrong category").unwrap();
        case.assign(Uuid::now_v7()).unwrap();

        case.resolve(ResolutionVerdict::Rejected);
        assert_eq!(case.product, ProductStatus::Active);
    }

    #[test]
    fn second_appeal_is_refused() {
        let mut case = Case::reported();
        case.assign(Uuid::now_v7()).unwrap();
        case.resolve(ResolutionVerdict::Accepted);
        case.appeal("first appeal").unwrap();

        assert_eq!(
            code(case.appeal("second appeal").unwrap_err()),
            ErrorCode::AppealAlreadySubmitted
        );
    }
}
