//! 认知层：Planner、Verifier、答案合成与 RPVM 主循环

pub mod collector;
pub mod events;
pub mod loop_;
pub mod planner;
pub mod prompts;
pub mod record;
pub mod synthesizer;
pub mod verifier;

pub use collector::{IntermediateRecord, ResultCollector};
pub use events::PipelineEvent;
pub use loop_::RpvmPipeline;
pub use planner::{parse_planner_output, parse_plans, PlanOutput, Planner};
pub use record::{IterationRecord, PipelineResult, TerminalMode};
pub use synthesizer::AnswerSynthesizer;
pub use verifier::{
    parse_verification_response, ParsedVerification, Verdict, VerificationResult, Verifier,
    VerifierSettings,
};
