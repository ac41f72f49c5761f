//! 答案评估：EM / token-F1 / Acc（多个标准答案取最大值）
//!
//! 归一化：小写、去标点、去冠词 a/an/the、合并空白。

use std::collections::HashMap;

use serde::Serialize;

pub fn normalize_answer(text: &str) -> String {
    let lower = text.to_lowercase();
    let no_punct: String = lower
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect();
    no_punct
        .split_whitespace()
        .filter(|w| !matches!(*w, "a" | "an" | "the"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn best_over<F: Fn(&str) -> f64>(golden: &[String], score: F) -> f64 {
    golden.iter().map(|g| score(g)).fold(0.0, f64::max)
}

pub fn exact_match(prediction: &str, golden: &[String]) -> f64 {
    let pred = normalize_answer(prediction);
    best_over(golden, |g| if normalize_answer(g) == pred { 1.0 } else { 0.0 })
}

/// 归一化后的标准答案是否出现在预测中
pub fn accuracy(prediction: &str, golden: &[String]) -> f64 {
    let pred = normalize_answer(prediction);
    best_over(golden, |g| {
        let g = normalize_answer(g);
        if !g.is_empty() && pred.contains(&g) {
            1.0
        } else {
            0.0
        }
    })
}

pub fn token_f1(prediction: &str, golden: &[String]) -> f64 {
    let pred = normalize_answer(prediction);
    let pred_tokens: Vec<&str> = pred.split_whitespace().collect();
    best_over(golden, |g| {
        let g = normalize_answer(g);
        let gold_tokens: Vec<&str> = g.split_whitespace().collect();
        f1_tokens(&pred_tokens, &gold_tokens)
    })
}

fn f1_tokens(pred: &[&str], gold: &[&str]) -> f64 {
    if pred.is_empty() || gold.is_empty() {
        return 0.0;
    }
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for &t in gold {
        *counts.entry(t).or_default() += 1;
    }
    let mut common = 0usize;
    for &t in pred {
        if let Some(c) = counts.get_mut(t) {
            if *c > 0 {
                *c -= 1;
                common += 1;
            }
        }
    }
    if common == 0 {
        return 0.0;
    }
    let precision = common as f64 / pred.len() as f64;
    let recall = common as f64 / gold.len() as f64;
    2.0 * precision * recall / (precision + recall)
}

/// 数据集平均分
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EvalSummary {
    pub count: usize,
    pub em: f64,
    pub f1: f64,
    pub acc: f64,
}

impl EvalSummary {
    /// `pairs`：(预测, 标准答案)；没有标准答案的样本不计入
    pub fn compute<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a [String])>,
    {
        let mut summary = Self::default();
        for (pred, golden) in pairs {
            if golden.is_empty() {
                continue;
            }
            summary.count += 1;
            summary.em += exact_match(pred, golden);
            summary.f1 += token_f1(pred, golden);
            summary.acc += accuracy(pred, golden);
        }
        if summary.count > 0 {
            let n = summary.count as f64;
            summary.em /= n;
            summary.f1 /= n;
            summary.acc /= n;
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gold(answers: &[&str]) -> Vec<String> {
        answers.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_answer("  The Eiffel Tower! "), "eiffel tower");
        assert_eq!(normalize_answer("An apple, a day"), "apple day");
    }

    #[test]
    fn test_exact_match_and_accuracy() {
        let g = gold(&["Paris", "City of Paris"]);
        assert_eq!(exact_match("paris.", &g), 1.0);
        assert_eq!(exact_match("It is Paris", &g), 0.0);
        assert_eq!(accuracy("It is Paris", &g), 1.0);
        assert_eq!(accuracy("London", &g), 0.0);
    }

    #[test]
    fn test_token_f1() {
        let g = gold(&["Barack Obama"]);
        assert_eq!(token_f1("Barack Obama", &g), 1.0);
        let partial = token_f1("Obama", &g);
        assert!((partial - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(token_f1("", &g), 0.0);
    }

    #[test]
    fn test_summary_skips_unlabeled() {
        let g1 = gold(&["yes"]);
        let g2: Vec<String> = vec![];
        let s = EvalSummary::compute(vec![("yes", g1.as_slice()), ("no", g2.as_slice())]);
        assert_eq!(s.count, 1);
        assert_eq!(s.em, 1.0);
    }
}
