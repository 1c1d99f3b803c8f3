//! Test doubles: scripted controllers, generators, and a recording sink.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rand::thread_rng;
use rsa::RsaPrivateKey;

use crate::error::{KeystoreError, PopAuthResult};
use crate::model::{
    AccountParameters, AccountRecord, ControllerOutcome, CorrelationId, DeviceCodeAuthorization,
    DeviceCodeFlowParameters, SecureHardwareState, ServiceFailure, ShrParameters,
    SilentTokenParameters, TokenParameters, TokenResult,
};
use crate::ports::{
    Controller, GeneratedKeyPair, GenerationError, GenerationFlags, KeyPairGenerator,
    TelemetryEvent, TelemetrySink,
};

/// A minimal successful token for scripting.
pub fn token_result(access_token: &str) -> TokenResult {
    TokenResult {
        access_token: access_token.to_string(),
        id_token: None,
        home_account_id: "home".to_string(),
        scopes: vec!["scope".to_string()],
        expires_in: 3600,
    }
}

/// A 512-bit software key pair; small on purpose so tests stay fast.
pub fn software_pair() -> GeneratedKeyPair {
    GeneratedKeyPair {
        private_key: RsaPrivateKey::new(&mut thread_rng(), 512).expect("test key generation"),
        secure_hardware: SecureHardwareState::SoftwareBacked,
        measured_length: Some(512),
    }
}

type Scripted<T> = Mutex<VecDeque<PopAuthResult<ControllerOutcome<T>>>>;

fn infrastructure_error<T>() -> PopAuthResult<ControllerOutcome<T>> {
    Err(KeystoreError::NotInitialized {
        reason: "scripted infrastructure failure".to_string(),
    }
    .into())
}

/// Controller whose per-operation outcomes are queued up front.
///
/// An unscripted call panics, so a test failure points at the exact
/// operation that ran unexpectedly.
#[derive(Default)]
pub struct ScriptedController {
    name: String,
    interactive: Scripted<TokenResult>,
    silent: Scripted<TokenResult>,
    renew: Scripted<TokenResult>,
    shr: Scripted<String>,
    authorize: Scripted<DeviceCodeAuthorization>,
    poll: Scripted<TokenResult>,
    accounts: Vec<AccountRecord>,
    removes: bool,
    silent_call_count: AtomicUsize,
    shr_call_count: AtomicUsize,
}

impl ScriptedController {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn silent_success(self, token: TokenResult) -> Self {
        self.silent
            .lock()
            .unwrap()
            .push_back(Ok(ControllerOutcome::Success(token)));
        self
    }

    pub fn silent_failure(self, failure: ServiceFailure) -> Self {
        self.silent
            .lock()
            .unwrap()
            .push_back(Ok(ControllerOutcome::Failure(failure)));
        self
    }

    pub fn silent_error(self) -> Self {
        self.silent.lock().unwrap().push_back(infrastructure_error());
        self
    }

    pub fn renew_success(self, token: TokenResult) -> Self {
        self.renew
            .lock()
            .unwrap()
            .push_back(Ok(ControllerOutcome::Success(token)));
        self
    }

    pub fn renew_failure(self, failure: ServiceFailure) -> Self {
        self.renew
            .lock()
            .unwrap()
            .push_back(Ok(ControllerOutcome::Failure(failure)));
        self
    }

    pub fn interactive_success(self, token: TokenResult) -> Self {
        self.interactive
            .lock()
            .unwrap()
            .push_back(Ok(ControllerOutcome::Success(token)));
        self
    }

    pub fn shr_success(self, shr: &str) -> Self {
        self.shr
            .lock()
            .unwrap()
            .push_back(Ok(ControllerOutcome::Success(shr.to_string())));
        self
    }

    pub fn shr_failure(self, failure: ServiceFailure) -> Self {
        self.shr
            .lock()
            .unwrap()
            .push_back(Ok(ControllerOutcome::Failure(failure)));
        self
    }

    pub fn authorize_success(self, authorization: DeviceCodeAuthorization) -> Self {
        self.authorize
            .lock()
            .unwrap()
            .push_back(Ok(ControllerOutcome::Success(authorization)));
        self
    }

    pub fn authorize_failure(self, failure: ServiceFailure) -> Self {
        self.authorize
            .lock()
            .unwrap()
            .push_back(Ok(ControllerOutcome::Failure(failure)));
        self
    }

    pub fn poll_success(self, token: TokenResult) -> Self {
        self.poll
            .lock()
            .unwrap()
            .push_back(Ok(ControllerOutcome::Success(token)));
        self
    }

    pub fn with_accounts(mut self, accounts: Vec<AccountRecord>) -> Self {
        self.accounts = accounts;
        self
    }

    pub fn removing(mut self, removes: bool) -> Self {
        self.removes = removes;
        self
    }

    pub fn silent_calls(&self) -> usize {
        self.silent_call_count.load(Ordering::SeqCst)
    }

    pub fn shr_calls(&self) -> usize {
        self.shr_call_count.load(Ordering::SeqCst)
    }

    fn next<T>(&self, queue: &Scripted<T>, op: &str) -> PopAuthResult<ControllerOutcome<T>> {
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("controller {:?}: unscripted {op} call", self.name))
    }
}

impl Controller for ScriptedController {
    fn name(&self) -> &str {
        &self.name
    }

    fn acquire_token(
        &self,
        _params: &TokenParameters,
        _correlation_id: &CorrelationId,
    ) -> PopAuthResult<ControllerOutcome<TokenResult>> {
        self.next(&self.interactive, "acquire_token")
    }

    fn acquire_token_silent(
        &self,
        _params: &SilentTokenParameters,
        _correlation_id: &CorrelationId,
    ) -> PopAuthResult<ControllerOutcome<TokenResult>> {
        self.silent_call_count.fetch_add(1, Ordering::SeqCst);
        self.next(&self.silent, "acquire_token_silent")
    }

    fn renew_access_token(
        &self,
        _params: &SilentTokenParameters,
        _correlation_id: &CorrelationId,
    ) -> PopAuthResult<ControllerOutcome<TokenResult>> {
        self.next(&self.renew, "renew_access_token")
    }

    fn generate_shr(
        &self,
        _params: &ShrParameters,
        _correlation_id: &CorrelationId,
    ) -> PopAuthResult<ControllerOutcome<String>> {
        self.shr_call_count.fetch_add(1, Ordering::SeqCst);
        self.next(&self.shr, "generate_shr")
    }

    fn device_code_flow_authorize(
        &self,
        _params: &DeviceCodeFlowParameters,
        _correlation_id: &CorrelationId,
    ) -> PopAuthResult<ControllerOutcome<DeviceCodeAuthorization>> {
        self.next(&self.authorize, "device_code_flow_authorize")
    }

    fn device_code_flow_poll(
        &self,
        _params: &DeviceCodeFlowParameters,
        _device_code: &str,
        _correlation_id: &CorrelationId,
    ) -> PopAuthResult<ControllerOutcome<TokenResult>> {
        self.next(&self.poll, "device_code_flow_poll")
    }

    fn load_accounts(
        &self,
        _params: &AccountParameters,
        _correlation_id: &CorrelationId,
    ) -> PopAuthResult<Vec<AccountRecord>> {
        Ok(self.accounts.clone())
    }

    fn remove_account(
        &self,
        _params: &AccountParameters,
        _correlation_id: &CorrelationId,
    ) -> PopAuthResult<bool> {
        Ok(self.removes)
    }
}

/// Generator whose attempt outcomes are queued up front, recording the
/// capability flags it was called with.
#[derive(Default)]
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<GeneratedKeyPair, GenerationError>>>,
    seen_flags: Mutex<Vec<GenerationFlags>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_err(self, err: GenerationError) -> Self {
        self.script.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn then_pair(self, pair: GeneratedKeyPair) -> Self {
        self.script.lock().unwrap().push_back(Ok(pair));
        self
    }

    pub fn seen_flags(&self) -> Vec<GenerationFlags> {
        self.seen_flags.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.seen_flags.lock().unwrap().len()
    }
}

impl KeyPairGenerator for ScriptedGenerator {
    fn generate(
        &self,
        _suite: &crate::model::CryptoSuite,
        flags: GenerationFlags,
    ) -> Result<GeneratedKeyPair, GenerationError> {
        self.seen_flags.lock().unwrap().push(flags);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .expect("generator: unscripted generate call")
    }
}

/// Telemetry sink that remembers every event.
#[derive(Default)]
pub struct RecordingTelemetry {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl RecordingTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl TelemetrySink for RecordingTelemetry {
    fn record(&self, event: TelemetryEvent) {
        self.events.lock().unwrap().push(event);
    }
}
