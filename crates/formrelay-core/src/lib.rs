//! Core library for `formrelay`.
//!
//! Implements the verify-then-deliver pipeline behind the contact form relay.
//! The HTTP surface lives in `formrelay-server`; this crate knows nothing
//! about origins, methods, or response headers.
//!
//! The two upstream collaborators sit behind traits so the pipeline can be
//! driven by stubs in tests:
//!
//! - [`VerificationService`] — checks a proof-of-humanity token
//!   ([`RecaptchaVerifier`] talks to the reCAPTCHA `siteverify` API)
//! - [`DeliveryService`] — hands a verified submission to the form-delivery
//!   API ([`Web3FormsDelivery`] talks to Web3Forms)

pub mod deliver;
pub mod error;
pub mod relay;
pub mod submission;
pub mod upstream;
pub mod verify;

pub use deliver::{
    DeliveryRequest, DeliveryResponse, DeliveryService, WEB3FORMS_SUBMIT_URL, Web3FormsDelivery,
};
pub use error::{RelayError, SubmissionError, UpstreamError};
pub use relay::{Credentials, Delivered, Relay, SenderLabels};
pub use submission::{Submission, ValidationMode};
pub use upstream::UpstreamBody;
pub use verify::{
    MIN_SCORE, RECAPTCHA_VERIFY_URL, RecaptchaVerifier, VerificationResult, VerificationService,
};
