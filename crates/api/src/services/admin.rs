use euclid_database::Repositories;

use super::error::ServiceError;
use crate::routes::models::StatsResponse;

pub async fn stats(repos: &Repositories) -> Result<StatsResponse, ServiceError> {
    Ok(StatsResponse {
        users: repos.users.count().await?,
        courses: repos.courses.count().await?,
        memberships: repos.members.count().await?,
        items: repos.items.count().await?,
    })
}
