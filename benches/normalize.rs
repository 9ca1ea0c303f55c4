use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use labgen::core::extract::try_parse_json;
use labgen::core::lab::{LabSpec, TemplateType};
use labgen::templates::normalize_with_report;
use serde_json::{Value, json};
use std::hint::black_box;

fn messy_payload(template: TemplateType) -> Value {
    match template {
        TemplateType::Analyze => {
            let rows: Vec<Value> = (0..200)
                .map(|i| json!({"day": format!("2024-01-{:02}", i % 28 + 1), "sales": i * 3, "note": null}))
                .collect();
            json!({"scenario": "Weekly sales", "dataset": {"name": "sales", "rows": rows}, "steps": ["Look", {"title": "Compare"}]})
        }
        TemplateType::Build => json!({
            "language": "JS",
            "testCases": [{"input": "[2,7,11,15], 9", "expectedOutput": "[0,1]"}, "bogus", {"name": ""}],
            "steps": [{"title": "Write it", "widgets": [{"type": "text_input"}, {"type": "slider"}]}],
            "hints": ["a", "a", "b"]
        }),
        TemplateType::Derive => json!({
            "initialStep": "x^2",
            "rules": [{"name": "Power rule", "formula": "d/dx x^n = n x^(n-1)"}, "Chain rule"],
            "steps": [{"expression": "2x"}, {"expression": "2"}],
            "expectedSteps": "many"
        }),
        TemplateType::Explain => json!({
            "artifact": {"code": "def f(x):\n    return x * 2\n", "language": "Python3"},
            "learningObjectives": "trace a function",
            "steps": [{"prompt": "What does f return?"}]
        }),
        TemplateType::Explore => json!({
            "parameters": [{"name": "Angle", "min": 90, "max": 0, "step": -5, "defaultValue": 200}, {"key": "mass"}],
            "guidingQuestions": []
        }),
        TemplateType::Revise => json!({
            "writingTask": "Persuasive letter",
            "originalDraft": "Dear council...",
            "rubric": [{"name": "Clarity", "maxPoints": 500}, "Tone"],
            "improvementAreas": [{"area": "Evidence", "suggestions": ["Cite data"]}]
        }),
    }
}

const ALL_TYPES: [TemplateType; 6] = [
    TemplateType::Analyze,
    TemplateType::Build,
    TemplateType::Derive,
    TemplateType::Explain,
    TemplateType::Explore,
    TemplateType::Revise,
];

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize_template_data");
    for template in ALL_TYPES {
        let payload = messy_payload(template);
        group.bench_with_input(
            BenchmarkId::from_parameter(template.as_str()),
            &payload,
            |b, payload| b.iter(|| normalize_with_report(template, black_box(payload))),
        );
    }
    group.finish();
}

fn bench_extract(c: &mut Criterion) {
    let body = json!({"labTitle": "Two Sum", "data": messy_payload(TemplateType::Analyze)}).to_string();
    let fenced = format!("Here is the lab:\n```json\n{}\n```\nEnjoy!", body);
    c.bench_function("try_parse_json_fenced", |b| {
        b.iter(|| try_parse_json(black_box(&fenced)))
    });
}

fn bench_renormalize_stored(c: &mut Criterion) {
    let stored = json!({
        "templateType": "build",
        "title": "Two Sum",
        "difficulty": "intro",
        "estimatedDurationMinutes": "45 minutes",
        "templateData": messy_payload(TemplateType::Build),
    });
    c.bench_function("lab_spec_from_value", |b| {
        b.iter(|| LabSpec::from_value(black_box(&stored)))
    });
}

criterion_group!(benches, bench_normalize, bench_extract, bench_renormalize_stored);
criterion_main!(benches);
