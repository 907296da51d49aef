//! Endpoints of the service under test and their typed payloads

use reviewload_core::Membership;
use reviewload_http::ApiRequest;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value as JsonValue};

pub const TEAM_ADD: &str = "/team/add";
pub const TEAM_GET: &str = "/team/get";
pub const PR_CREATE: &str = "/pullRequest/create";
pub const PR_MERGE: &str = "/pullRequest/merge";
pub const PR_REASSIGN: &str = "/pullRequest/reassign";
pub const USER_GET_REVIEW: &str = "/users/getReview";
pub const USER_SET_ACTIVE: &str = "/users/setIsActive";
pub const STATISTICS_GET: &str = "/statistics/get";

#[derive(Debug, Serialize)]
pub struct CreateTeamBody<'a> {
    pub team_name: &'a str,
    pub members: &'a [Membership],
}

#[derive(Debug, Serialize)]
pub struct CreatePrBody<'a> {
    pub pull_request_id: &'a str,
    pub pull_request_name: &'a str,
    pub author_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct MergePrBody<'a> {
    pub pull_request_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ReassignBody<'a> {
    pub pull_request_id: &'a str,
    pub old_user_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SetActiveBody<'a> {
    pub user_id: &'a str,
    pub is_active: bool,
}

fn post<T: Serialize>(path: &str, body: &T) -> ApiRequest {
    // Serialization of these bodies cannot fail
    let body = serde_json::to_value(body).unwrap_or(JsonValue::Null);
    ApiRequest::post(path, body)
}

pub fn create_team(name: &str, members: &[Membership]) -> ApiRequest {
    post(
        TEAM_ADD,
        &CreateTeamBody {
            team_name: name,
            members,
        },
    )
}

pub fn get_team(name: &str) -> ApiRequest {
    ApiRequest::get(TEAM_GET).with_query("team_name", name)
}

pub fn create_pr(id: &str, title: &str, author_id: &str) -> ApiRequest {
    post(
        PR_CREATE,
        &CreatePrBody {
            pull_request_id: id,
            pull_request_name: title,
            author_id,
        },
    )
}

pub fn merge_pr(id: &str) -> ApiRequest {
    post(PR_MERGE, &MergePrBody { pull_request_id: id })
}

pub fn reassign_reviewer(pr_id: &str, old_user_id: &str) -> ApiRequest {
    post(
        PR_REASSIGN,
        &ReassignBody {
            pull_request_id: pr_id,
            old_user_id,
        },
    )
}

pub fn get_user_review(user_id: &str) -> ApiRequest {
    ApiRequest::get(USER_GET_REVIEW).with_query("user_id", user_id)
}

pub fn set_user_active(user_id: &str, is_active: bool) -> ApiRequest {
    post(USER_SET_ACTIVE, &SetActiveBody { user_id, is_active })
}

pub fn get_statistics() -> ApiRequest {
    ApiRequest::get(STATISTICS_GET)
}

// Response schemas. A field typed `JsonValue` only has to be present.

/// `GET /team/get`
#[derive(Debug, Deserialize)]
pub struct TeamResponse {
    pub team_name: JsonValue,
}

/// `GET /team/get` as read by the reviewer lookup
#[derive(Debug, Deserialize)]
pub struct TeamMembersResponse {
    #[serde(default)]
    pub members: Vec<TeamMember>,
}

#[derive(Debug, Deserialize)]
pub struct TeamMember {
    pub user_id: String,
}

/// Any response carrying a `pr` key. The key must be present; its value may
/// be null.
#[derive(Debug, Deserialize)]
pub struct PrResponse {
    pub pr: JsonValue,
}

impl PrResponse {
    pub fn status(&self) -> Option<&str> {
        self.pr.get("status").and_then(JsonValue::as_str)
    }
}

/// `POST /pullRequest/reassign`
#[derive(Debug, Deserialize)]
pub struct ReassignResponse {
    pub pr: JsonValue,
    pub replaced_by: JsonValue,
}

/// `GET /users/getReview`
#[derive(Debug, Deserialize)]
pub struct UserReviewResponse {
    pub user_id: JsonValue,
    pub pull_requests: Vec<JsonValue>,
}

/// `POST /users/setIsActive`
#[derive(Debug, Deserialize)]
pub struct SetActiveResponse {
    pub user: UserView,
}

#[derive(Debug, Deserialize)]
pub struct UserView {
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// `GET /statistics/get`
#[derive(Debug, Deserialize)]
pub struct StatisticsResponse {
    pub statistics: Statistics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_prs: Number,
    #[serde(default)]
    pub open_prs: Option<Number>,
    #[serde(default)]
    pub merged_prs: Option<Number>,
    pub user_assignments: Vec<JsonValue>,
}
