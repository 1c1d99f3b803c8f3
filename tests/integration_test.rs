//! End-to-end tests over the public API.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use popauth::error::{CommandError, PopAuthError, PopAuthResult};
use popauth::logic::jwk_thumbprint;
use popauth::model::{
    AccountParameters, AccountRecord, Command, CommandPayload, CommandRequest, CommandResult,
    ControllerOutcome, CorrelationId, DeviceCodeAuthorization, DeviceCodeFlowParameters,
    ErrorCode, RsaJwk, ServiceFailure, ShrParameters, SilentTokenParameters, TokenParameters,
    TokenResult,
};
use popauth::ports::Controller;
use url::Url;

/// Controller whose silent outcomes are queued per test.
struct StubController {
    name: String,
    silent: Mutex<VecDeque<ControllerOutcome<TokenResult>>>,
}

impl StubController {
    fn new(name: &str, outcomes: Vec<ControllerOutcome<TokenResult>>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            silent: Mutex::new(outcomes.into()),
        })
    }
}

impl Controller for StubController {
    fn name(&self) -> &str {
        &self.name
    }

    fn acquire_token(
        &self,
        _params: &TokenParameters,
        _correlation_id: &CorrelationId,
    ) -> PopAuthResult<ControllerOutcome<TokenResult>> {
        unimplemented!("interactive is not stubbed")
    }

    fn acquire_token_silent(
        &self,
        _params: &SilentTokenParameters,
        _correlation_id: &CorrelationId,
    ) -> PopAuthResult<ControllerOutcome<TokenResult>> {
        Ok(self
            .silent
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected silent call"))
    }

    fn renew_access_token(
        &self,
        _params: &SilentTokenParameters,
        _correlation_id: &CorrelationId,
    ) -> PopAuthResult<ControllerOutcome<TokenResult>> {
        unimplemented!("renew is not stubbed")
    }

    fn generate_shr(
        &self,
        _params: &ShrParameters,
        _correlation_id: &CorrelationId,
    ) -> PopAuthResult<ControllerOutcome<String>> {
        unimplemented!("shr is not stubbed")
    }

    fn device_code_flow_authorize(
        &self,
        _params: &DeviceCodeFlowParameters,
        _correlation_id: &CorrelationId,
    ) -> PopAuthResult<ControllerOutcome<DeviceCodeAuthorization>> {
        Ok(ControllerOutcome::Success(DeviceCodeAuthorization {
            verification_uri: "https://device.example/activate".to_string(),
            user_code: "ABCD-1234".to_string(),
            device_code: "device-code-1".to_string(),
            message: "Visit the URL and enter the code".to_string(),
            expires_in: 900,
        }))
    }

    fn device_code_flow_poll(
        &self,
        _params: &DeviceCodeFlowParameters,
        device_code: &str,
        _correlation_id: &CorrelationId,
    ) -> PopAuthResult<ControllerOutcome<TokenResult>> {
        Ok(ControllerOutcome::Success(TokenResult {
            access_token: format!("token-for-{device_code}"),
            id_token: None,
            home_account_id: "home".to_string(),
            scopes: vec!["scope".to_string()],
            expires_in: 3600,
        }))
    }

    fn load_accounts(
        &self,
        _params: &AccountParameters,
        _correlation_id: &CorrelationId,
    ) -> PopAuthResult<Vec<AccountRecord>> {
        Ok(Vec::new())
    }

    fn remove_account(
        &self,
        _params: &AccountParameters,
        _correlation_id: &CorrelationId,
    ) -> PopAuthResult<bool> {
        Ok(false)
    }
}

fn token(access_token: &str) -> TokenResult {
    TokenResult {
        access_token: access_token.to_string(),
        id_token: None,
        home_account_id: "home".to_string(),
        scopes: vec!["scope".to_string()],
        expires_in: 3600,
    }
}

fn silent_command() -> Command {
    Command::new(
        CommandRequest::AcquireTokenSilent(SilentTokenParameters {
            client_id: "client-id".to_string(),
            authority: "https://login.example/tenant".to_string(),
            scopes: vec!["User.Read".to_string()],
            home_account_id: "uid.utid".to_string(),
            force_refresh: false,
        }),
        "acquire_token_silent",
    )
}

#[test]
fn test_silent_acquisition_falls_back_across_controllers() {
    let local = StubController::new(
        "local",
        vec![ControllerOutcome::failure(
            ErrorCode::NoTokensFound,
            "cache is cold",
        )],
    );
    let broker = StubController::new("broker", vec![ControllerOutcome::Success(token("at"))]);
    let dispatcher = popauth::dispatcher(vec![local as Arc<dyn Controller>, broker], 2);

    let result = dispatcher.submit_blocking(silent_command()).unwrap();
    match result {
        CommandResult::Completed { payload, .. } => match payload {
            CommandPayload::Token(t) => assert_eq!(t.access_token, "at"),
            other => panic!("expected a token: {other:?}"),
        },
        other => panic!("expected completion: {other:?}"),
    }
}

#[test]
fn test_first_recoverable_failure_surfaces_after_exhaustion() {
    let local = StubController::new(
        "local",
        vec![ControllerOutcome::Failure(ServiceFailure::new(
            ErrorCode::InvalidGrant,
            "refresh token expired",
        ))],
    );
    let broker = StubController::new(
        "broker",
        vec![ControllerOutcome::Failure(ServiceFailure::new(
            ErrorCode::NoAccountFound,
            "broker has no account",
        ))],
    );
    let dispatcher = popauth::dispatcher(vec![local as Arc<dyn Controller>, broker], 2);

    let result = dispatcher.submit_blocking(silent_command()).unwrap();
    match result {
        CommandResult::Failed { error, .. } => match &*error {
            PopAuthError::Command(CommandError::Service { code, message }) => {
                assert_eq!(*code, ErrorCode::InvalidGrant);
                assert_eq!(message, "refresh token expired");
            }
            other => panic!("expected the first service failure: {other:?}"),
        },
        other => panic!("expected failure: {other:?}"),
    }
}

#[test]
fn test_device_code_flow_two_phase() {
    let controller = StubController::new("local", vec![]);
    let dispatcher = popauth::dispatcher(vec![controller as Arc<dyn Controller>], 2);

    let params = DeviceCodeFlowParameters {
        client_id: "client-id".to_string(),
        authority: "https://login.example/tenant".to_string(),
        scopes: vec!["User.Read".to_string()],
    };

    let (code_tx, code_rx) = std::sync::mpsc::channel();
    let (result_tx, result_rx) = std::sync::mpsc::channel();
    dispatcher.submit_device_code_flow(
        Command::new(CommandRequest::DeviceCodeFlow(params), "device_code_flow"),
        Arc::new(popauth::adapters::InlineQueue),
        Box::new(move |authorization: &DeviceCodeAuthorization| {
            let _ = code_tx.send(authorization.user_code.clone());
        }),
        Box::new(move |result| {
            let _ = result_tx.send(result);
        }),
    );

    // The user code surfaces after authorization, then polling delivers
    // the token bound to the authorized device code.
    let user_code = code_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(user_code, "ABCD-1234");
    let result = result_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    match result {
        CommandResult::Completed {
            payload: CommandPayload::Token(t),
            ..
        } => assert_eq!(t.access_token, "token-for-device-code-1"),
        other => panic!("expected a token: {other:?}"),
    }
}

#[test]
fn test_pop_manager_end_to_end() {
    let manager = popauth::software_pop_manager();
    let thumbprint = manager.generate_asymmetric_key().unwrap();

    let params = ShrParameters {
        home_account_id: "uid.utid".to_string(),
        http_method: Some("GET".to_string()),
        url: Url::parse("https://resource.example/api/items?id=7").unwrap(),
        nonce: Some("server-nonce".to_string()),
        client_claims: None,
    };
    let shr = manager
        .mint_signed_http_request(&params, Some("bearer-token"), 1_700_000_000)
        .unwrap();

    let claims = manager.verify_signed_http_request(&shr).unwrap();
    assert_eq!(claims["u"], "resource.example");
    assert_eq!(claims["p"], "/api/items");
    assert_eq!(claims["m"], "GET");
    assert_eq!(claims["at"], "bearer-token");
    assert_eq!(claims["nonce"], "server-nonce");

    // The embedded cnf key is the device key.
    let jwk: RsaJwk = serde_json::from_value(claims["cnf"]["jwk"].clone()).unwrap();
    assert_eq!(jwk_thumbprint(&jwk).unwrap(), thumbprint);
}

#[test]
fn test_file_backed_key_survives_reopen() {
    let dir = std::env::temp_dir().join(format!("popauth-e2e-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);

    let first = popauth::file_backed_pop_manager(&dir).unwrap();
    let thumbprint = first.generate_asymmetric_key().unwrap();
    drop(first);

    let second = popauth::file_backed_pop_manager(&dir).unwrap();
    assert_eq!(second.get_asymmetric_key_thumbprint().unwrap(), thumbprint);

    assert!(second.clear_asymmetric_key().unwrap());
    let _ = std::fs::remove_dir_all(&dir);
}
