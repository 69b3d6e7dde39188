use crate::application::ports::user_repository::{UserRepository, UserRow};

pub struct ListUsers<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: UserRepository + ?Sized> ListUsers<'a, R> {
    pub async fn execute(&self) -> anyhow::Result<Vec<UserRow>> {
        let users = self.repo.list_users().await?;
        Ok(users
            .into_iter()
            .map(|u| UserRow {
                password_hash: None,
                ..u
            })
            .collect())
    }
}
