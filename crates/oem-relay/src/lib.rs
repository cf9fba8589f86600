//! Rule-driven email relay for Oracle Enterprise Manager alert events.
//!
//! `oem-relay` reads an OEM event, evaluates it against an ordered set of
//! rules loaded from an INI file, and emails the recipients of every matching
//! rule through an external `sendEmail` compatible transport.
//!
//! # Features
//!
//! - **INI Configuration**: A forgiving line-oriented parser with section-scoped keys
//! - **Wildcard Conditions**: Match on target name, target type and lifecycle status
//! - **Evaluation Modes**: Notify for the first matching rule or for all of them
//! - **Priorities**: Map rule priorities to `X-Priority` headers
//! - **Dry Runs**: Disable sending and log what would have been sent
//!
//! # Example
//!
//! ```rust
//! use oem_relay::{
//!     EmailDispatcher, Event, RelayConfig, RuleEvaluator, SendEmailTransport,
//! };
//!
//! let config = RelayConfig::parse(
//!     "[SMTP]\n\
//!      server = smtp.example.com\n\
//!      port = 25\n\
//!      sender = oem@example.com\n\
//!      [SENDMAIL]\n\
//!      enable = false\n\
//!      [RULES]\n\
//!      rule1.condition.target_type = all\n\
//!      rule1.action.recipients = ops@example.com\n\
//!      rule1.action.priority = 1\n",
//! );
//!
//! let transport = SendEmailTransport::new(&config.sendmail.program, config.sendmail.timeout());
//! let dispatcher = EmailDispatcher::new(config.smtp.clone(), &config.sendmail, transport);
//! let evaluator = RuleEvaluator::new(dispatcher);
//!
//! let event = Event::from_lookup(|name| match name {
//!     "TARGET_TYPE" => Some("oracle_database".to_string()),
//!     _ => None,
//! });
//!
//! let runtime = tokio::runtime::Builder::new_current_thread()
//!     .enable_all()
//!     .build()
//!     .unwrap();
//! let report = runtime.block_on(evaluator.evaluate(&event, &config.rules, config.evaluation_mode));
//!
//! assert_eq!(report.matched_rules(), vec![1]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod dispatch;
pub mod error;
pub mod evaluator;
pub mod ini;
pub mod rules;
pub mod transport;
pub mod types;

// Re-export main types at crate root
pub use config::{DebugSettings, RelayConfig, ResolvedSmtp, SendmailSettings, SmtpSettings};
pub use dispatch::{DispatchOutcome, EmailDispatcher, Notification, normalize_recipients};
pub use error::{RelayError, Result};
pub use evaluator::{EvaluationReport, NotificationOutcome, RuleEvaluator};
pub use ini::IniDocument;
pub use rules::RuleTable;
pub use transport::{MailMessage, MailTransport, SendEmailTransport};
pub use types::{Condition, EvaluationMode, Event, Priority, Rule};
