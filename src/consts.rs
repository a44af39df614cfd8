pub mod watcher {
    /// Delay between status polls. The first poll fires one full interval
    /// after submission succeeds, never earlier.
    pub const POLL_INTERVAL_MS: u64 = 2000;

    /// Event channel capacity. A watch session emits at most one event per
    /// poll tick, so this never fills in practice.
    pub const EVENT_QUEUE_SIZE: usize = 100;
}

pub mod api {
    /// Per-request timeout for the HTTP client.
    pub const REQUEST_TIMEOUT_SECS: u64 = 10;

    /// Name of the cookie holding the CSRF token issued by the server.
    pub const CSRF_COOKIE: &str = "csrftoken";
}

pub mod validation {
    /// Accepted extension for the input dataframe, matched case-insensitively.
    pub const INPUT_DATAFRAME_EXTENSION: &str = "csv";

    /// Accepted extension for the parameter file, matched case-insensitively.
    pub const PARAM_FILE_EXTENSION: &str = "json";
}
