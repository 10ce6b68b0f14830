//! Unified Client Facade
//!
//! [`PhoebeClient`] composes one [`SessionClient`] and one
//! [`CommandClient`] over identical connection parameters and keeps their
//! duplicated state consistent:
//! - the bearer token is pushed into both sub-clients after
//!   register/login (or via [`set_token`](PhoebeClient::set_token)),
//! - the session id returned by start-session is bound into the command
//!   client.
//!
//! All domain operations are thin translations into
//! [`execute`](PhoebeClient::execute).

use log::info;
use serde_json::{json, Map, Value};

use crate::command::CommandClient;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::session::SessionClient;
use crate::transport::Transport;

/// Main client providing unified access to a phoebe-server instance.
pub struct PhoebeClient {
    config: ClientConfig,
    sessions: SessionClient,
    commands: CommandClient,
}

impl PhoebeClient {
    /// Connect parameters come from `config`; when `auto_session` is set
    /// a session is started immediately.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let sessions = SessionClient::new(&config)?;
        let commands = CommandClient::new(&config)?;
        Self::assemble(config, sessions, commands)
    }

    /// Construct over caller-supplied transports. Tests use this to
    /// record traffic without a live server.
    pub fn with_transports(
        config: ClientConfig,
        session_transport: Box<dyn Transport>,
        command_transport: Box<dyn Transport>,
    ) -> ClientResult<Self> {
        let sessions = SessionClient::with_transport(&config, session_transport)?;
        let commands = CommandClient::with_transport(&config, command_transport)?;
        Self::assemble(config, sessions, commands)
    }

    fn assemble(
        config: ClientConfig,
        sessions: SessionClient,
        commands: CommandClient,
    ) -> ClientResult<Self> {
        let mut client = Self {
            config,
            sessions,
            commands,
        };
        if client.config.auto_session {
            client.start_session(None)?;
        }
        Ok(client)
    }

    /// Connection parameters this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // ---- auth ---------------------------------------------------------

    /// Discover the server's auth mode.
    pub fn get_auth_config(&self) -> ClientResult<Value> {
        self.sessions.get_auth_config()
    }

    /// Register a new user and push the captured token into both
    /// sub-clients.
    pub fn register(
        &mut self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> ClientResult<Value> {
        let result = self.sessions.register(email, password, first_name, last_name)?;
        self.sync_token();
        Ok(result)
    }

    /// Log in and push the captured token into both sub-clients.
    pub fn login(&mut self, email: &str, password: &str) -> ClientResult<Value> {
        let result = self.sessions.login(email, password)?;
        self.sync_token();
        Ok(result)
    }

    /// Manually set or clear the bearer token on both sub-clients, e.g.
    /// for an externally issued JWT.
    pub fn set_token(&mut self, token: Option<String>) {
        self.sessions.set_token(token.clone());
        self.commands.set_token(token);
    }

    fn sync_token(&mut self) {
        self.commands.set_token(self.sessions.token().map(str::to_string));
    }

    /// Current authenticated user's info.
    pub fn get_me(&self) -> ClientResult<Value> {
        self.sessions.get_me()
    }

    // ---- sessions -----------------------------------------------------

    /// Start a server-side session and bind the returned id into the
    /// command client.
    pub fn start_session(&mut self, metadata: Option<&Value>) -> ClientResult<Value> {
        let response = self.sessions.start_session(metadata)?;
        let session_id = response
            .get("session_id")
            .and_then(Value::as_str)
            .map(str::to_string);
        if let Some(id) = &session_id {
            info!("session started: {id}");
        }
        self.commands.set_session_id(session_id);
        Ok(response)
    }

    /// Bind or clear the session id directly, e.g. to attach to a
    /// session started elsewhere.
    pub fn set_session_id(&mut self, session_id: Option<String>) {
        self.commands.set_session_id(session_id);
    }

    /// Currently bound session id, if any.
    pub fn session_id(&self) -> Option<&str> {
        self.commands.session_id()
    }

    /// End a session, defaulting to the currently bound one. The binding
    /// is cleared only when the ended id equals the bound id. With no
    /// explicit id and nothing bound, this is a no-op.
    pub fn end_session(&mut self, session_id: Option<&str>) -> ClientResult<()> {
        let sid = session_id
            .map(str::to_string)
            .or_else(|| self.commands.session_id().map(str::to_string));
        let Some(sid) = sid else {
            return Ok(());
        };

        self.sessions.end_session(&sid)?;
        if self.commands.session_id() == Some(sid.as_str()) {
            self.commands.set_session_id(None);
        }
        info!("session ended: {sid}");
        Ok(())
    }

    /// List sessions known to the server.
    pub fn get_sessions(&self) -> ClientResult<Value> {
        self.sessions.get_sessions()
    }

    /// Per-session memory metrics.
    pub fn get_memory_usage(&self) -> ClientResult<Value> {
        self.sessions.get_memory_usage()
    }

    /// Server port allocation status.
    pub fn get_port_status(&self) -> ClientResult<Value> {
        self.sessions.get_port_status()
    }

    /// Run `body` inside a server session.
    ///
    /// Starts a session first when none is bound; ends the currently
    /// bound session afterwards on every exit path. A failure in `body`
    /// propagates unchanged — the release still runs but its own error is
    /// dropped in that case. On the success path a release failure is
    /// reported.
    pub fn with_session<T, E, F>(&mut self, body: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
        E: From<ClientError>,
    {
        if self.commands.session_id().is_none() {
            self.start_session(None).map_err(E::from)?;
        }
        let result = body(self);
        let released = self.end_session(None);
        match result {
            Ok(value) => {
                released.map_err(E::from)?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }

    // ---- PHOEBE operations --------------------------------------------

    /// Execute an arbitrary command in the bound session. All the
    /// convenience methods below reduce to this.
    pub fn execute(&self, command: &str, args: Map<String, Value>) -> ClientResult<Value> {
        self.commands.execute(command, args)
    }

    /// Set the system morphology (e.g. `"detached"`).
    pub fn set_morphology(&self, morphology: &str) -> ClientResult<Value> {
        self.execute("set_morphology", pairs([("morphology", json!(morphology))]))
    }

    /// Attach a batch of parameter definitions to the bundle.
    pub fn attach_parameters(&self, parameters: Vec<Value>) -> ClientResult<Value> {
        self.execute("attach_parameters", pairs([("parameters", json!(parameters))]))
    }

    /// Fetch a parameter by qualifier; `filter` carries any extra
    /// twig-style constraints (component, context, dataset, ...).
    pub fn get_parameter(&self, qualifier: &str, filter: Map<String, Value>) -> ClientResult<Value> {
        let mut args = pairs([("qualifier", json!(qualifier))]);
        args.extend(filter);
        self.execute("get_parameter", args)
    }

    /// Whether the parameter with the given unique id is constrained.
    pub fn is_parameter_constrained(&self, uniqueid: &str) -> ClientResult<Value> {
        self.execute(
            "is_parameter_constrained",
            pairs([("uniqueid", json!(uniqueid))]),
        )
    }

    /// Refresh the unique id for a twig.
    pub fn update_uniqueid(&self, twig: &str) -> ClientResult<Value> {
        self.execute("update_uniqueid", pairs([("twig", json!(twig))]))
    }

    /// Get the value of the parameter identified by `filter`.
    pub fn get_value(&self, filter: Map<String, Value>) -> ClientResult<Value> {
        self.execute("get_value", filter)
    }

    /// Set the value of the parameter identified by `filter`.
    pub fn set_value(&self, value: Value, filter: Map<String, Value>) -> ClientResult<Value> {
        let mut args = pairs([("value", value)]);
        args.extend(filter);
        self.execute("set_value", args)
    }

    /// Add a dataset; `args` carries kind, times, passband and friends.
    pub fn add_dataset(&self, args: Map<String, Value>) -> ClientResult<Value> {
        self.execute("add_dataset", args)
    }

    /// Remove a dataset by label.
    pub fn remove_dataset(&self, dataset: &str) -> ClientResult<Value> {
        self.execute("remove_dataset", pairs([("dataset", json!(dataset))]))
    }

    /// List attached datasets.
    pub fn get_datasets(&self) -> ClientResult<Value> {
        self.execute("get_datasets", Map::new())
    }

    /// Run the forward model.
    pub fn run_compute(&self, args: Map<String, Value>) -> ClientResult<Value> {
        self.execute("run_compute", args)
    }

    /// Run a solver.
    pub fn run_solver(&self, args: Map<String, Value>) -> ClientResult<Value> {
        self.execute("run_solver", args)
    }

    /// Fetch the full bundle state.
    pub fn get_bundle(&self) -> ClientResult<Value> {
        self.execute("get_bundle", Map::new())
    }

    /// Load a serialized bundle into the session.
    pub fn load_bundle(&self, bundle: &str) -> ClientResult<Value> {
        self.execute("load_bundle", pairs([("bundle", json!(bundle))]))
    }

    /// Serialize the session's bundle.
    pub fn save_bundle(&self) -> ClientResult<Value> {
        self.execute("save_bundle", Map::new())
    }
}

impl std::fmt::Debug for PhoebeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhoebeClient")
            .field("config", &self.config)
            .field("session_id", &self.commands.session_id())
            .finish()
    }
}

/// Build an args mapping from literal pairs.
fn pairs<const N: usize>(entries: [(&str, Value); N]) -> Map<String, Value> {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}
