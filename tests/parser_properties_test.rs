//! 解析器性质：任意回复下 Plan Parser 非空、验证解析恰好给出一个结论

use rpvm::pipeline::{parse_planner_output, parse_plans, parse_verification_response, PlanOutput, Verdict};

const RESPONSES: &[&str] = &[
    "",
    "\n\n   \n",
    "# heading only",
    "1. one\n2. two",
    "1) one\n2) two\n\nANSWER_READY",
    "Some prose without numbers.",
    "Verdict: SUPPORTED\nCorrected Statement: x\nEvidence: y",
    "verdict:\ncorrected statement:\nevidence:",
    "VERDICT - supported",
    "Verdict: contradicted\nVerdict: insufficient",
    ":::\n1.\n)",
    "中文回复：没有编号",
];

#[test]
fn test_plan_parser_never_empty() {
    for response in RESPONSES {
        let plans = parse_plans(response);
        assert!(!plans.is_empty(), "empty plans for {:?}", response);
        assert!(plans.iter().all(|p| !p.trim().is_empty()));
    }
}

#[test]
fn test_ready_marker_wins_over_numbered_lines() {
    for response in RESPONSES {
        let out = parse_planner_output(response);
        if response.contains("ANSWER_READY") {
            assert_eq!(out, PlanOutput::Ready);
        } else {
            assert!(matches!(out, PlanOutput::Plans(ref p) if !p.is_empty()));
        }
    }
}

#[test]
fn test_verification_parser_total() {
    for response in RESPONSES {
        let parsed = parse_verification_response(response, "original plan");
        assert!(matches!(
            parsed.verdict,
            Verdict::Supported | Verdict::Contradicted | Verdict::Insufficient
        ));
        assert!(!parsed.corrected_text.is_empty());
    }
}

#[test]
fn test_last_verdict_line_wins() {
    // 每个 verdict 行都会覆盖前一个识别出的结论
    let parsed = parse_verification_response("Verdict: contradicted\nVerdict: insufficient", "p");
    assert_eq!(parsed.verdict, Verdict::Insufficient);
    // 不是 "verdict:" 前缀的行不参与
    let parsed = parse_verification_response("VERDICT - supported", "p");
    assert_eq!(parsed.verdict, Verdict::Insufficient);
}
