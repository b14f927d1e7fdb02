// Role lookups and assignment against the user_roles table

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::info;
use uuid::Uuid;

use crate::{
    app::AppState,
    db::DieselPool,
    models::role::{NewUserRole, Role, RoleName},
    utils::ServiceError,
};

pub struct RoleService {
    diesel_pool: DieselPool,
}

impl RoleService {
    pub fn new(state: &AppState) -> Self {
        Self {
            diesel_pool: state.diesel_pool.clone(),
        }
    }

    /// Returns the role names assigned to a user, empty when none.
    pub async fn get_user_roles(&self, user_id: Uuid) -> Result<Vec<String>, ServiceError> {
        use crate::schema::{roles, user_roles};

        let mut conn = self.diesel_pool.get().await?;

        let names = user_roles::table
            .inner_join(roles::table.on(roles::id.eq(user_roles::role_id)))
            .filter(user_roles::user_id.eq(user_id))
            .select(roles::name)
            .load::<String>(&mut conn)
            .await?;

        Ok(names)
    }

    pub async fn has_role(&self, user_id: Uuid, role: RoleName) -> Result<bool, ServiceError> {
        let names = self.get_user_roles(user_id).await?;
        Ok(names.iter().any(|n| n == role.as_str()))
    }

    /// Fails with `Forbidden` when the user does not hold the role.
    pub async fn require_role(&self, user_id: Uuid, role: RoleName) -> Result<(), ServiceError> {
        if self.has_role(user_id, role).await? {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(role.as_str().to_string()))
        }
    }

    /// Assigns a role to a user. Assigning an already-held role is a
    /// conflict.
    pub async fn assign_role(&self, user_id: Uuid, role: RoleName) -> Result<(), ServiceError> {
        use crate::schema::{roles, user_roles};

        let mut conn = self.diesel_pool.get().await?;

        let role_row = roles::table
            .filter(roles::name.eq(role.as_str()))
            .first::<Role>(&mut conn)
            .await?;

        let new_assignment = NewUserRole {
            id: Uuid::new_v4(),
            user_id,
            role_id: role_row.id,
            created_at: Utc::now(),
        };

        // The unique (user_id, role_id) constraint turns a duplicate
        // assignment into a Conflict via the error conversion
        diesel::insert_into(user_roles::table)
            .values(&new_assignment)
            .execute(&mut conn)
            .await?;

        info!(user_id = %user_id, role = %role.as_str(), "Role assigned");
        Ok(())
    }

    /// Removes a role from a user. Removing a role the user does not
    /// hold is a not-found error.
    pub async fn remove_role(&self, user_id: Uuid, role: RoleName) -> Result<(), ServiceError> {
        use crate::schema::{roles, user_roles};

        let mut conn = self.diesel_pool.get().await?;

        let role_row = roles::table
            .filter(roles::name.eq(role.as_str()))
            .first::<Role>(&mut conn)
            .await?;

        let deleted = diesel::delete(
            user_roles::table
                .filter(user_roles::user_id.eq(user_id))
                .filter(user_roles::role_id.eq(role_row.id)),
        )
        .execute(&mut conn)
        .await?;

        if deleted == 0 {
            return Err(ServiceError::NotFound);
        }

        info!(user_id = %user_id, role = %role.as_str(), "Role removed");
        Ok(())
    }
}
