use tracing::{debug, info};

use super::Store;
use crate::action::Action;
use crate::error::OperationError;
use crate::http::Transport;
use crate::state::RequestStatus;
use crate::types::{LoginData, LoginParams, MeData};

impl<T: Transport> Store<T> {
    pub async fn login(&self, params: &LoginParams) -> Result<LoginData, OperationError> {
        debug!(email = %params.email, "logging in");
        self.set_status(RequestStatus::Loading).await;
        let request = self.client.build_login(params);
        let envelope = self.call(request, |c, r| c.parse_login(r), true).await?;
        let data = self.expect_success(envelope, true).await?;

        info!(user_id = data.user_id, "logged in");
        self.dispatch_all(vec![
            Action::SetLoggedIn(true),
            Action::SetAppStatus(RequestStatus::Succeeded),
        ])
        .await;
        Ok(data)
    }

    /// End the session and drop every todolist and task.
    pub async fn logout(&self) -> Result<(), OperationError> {
        debug!("logging out");
        self.set_status(RequestStatus::Loading).await;
        let request = Ok(self.client.build_logout());
        let envelope = self.call(request, |c, r| c.parse_logout(r), true).await?;
        self.expect_success(envelope, true).await?;

        info!("logged out");
        self.dispatch_all(vec![
            Action::ClearTasksAndTodolists,
            Action::SetLoggedIn(false),
            Action::SetAppStatus(RequestStatus::Succeeded),
        ])
        .await;
        Ok(())
    }

    /// Probe for an existing session on startup.
    ///
    /// Failing the probe is the normal "not logged in yet" case, so no error
    /// message is shown. The app is marked initialized whatever the outcome.
    pub async fn initialize_app(&self) -> Result<MeData, OperationError> {
        let result = self.probe_session().await;
        self.dispatch(Action::SetAppInitialized(true)).await;
        result
    }

    async fn probe_session(&self) -> Result<MeData, OperationError> {
        debug!("probing session");
        self.set_status(RequestStatus::Loading).await;
        let request = Ok(self.client.build_me());
        let envelope = self.call(request, |c, r| c.parse_me(r), false).await?;
        let me = self.expect_success(envelope, false).await?;

        info!(login = %me.login, "session restored");
        self.dispatch_all(vec![
            Action::SetLoggedIn(true),
            Action::SetAppStatus(RequestStatus::Succeeded),
        ])
        .await;
        Ok(me)
    }
}
