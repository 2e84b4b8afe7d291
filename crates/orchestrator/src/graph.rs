use studio_core::StepKind;

/// Mermaid diagram of the fixed pipeline topology.
pub fn workflow_graph() -> String {
    let researcher = StepKind::Researcher.as_str();
    let writer = StepKind::Writer.as_str();
    let reviewer = StepKind::Reviewer.as_str();

    [
        "graph TD".to_string(),
        format!("    start([start]) --> {}[{}]", researcher, researcher),
        format!("    {} --> {}[{}]", researcher, writer, writer),
        format!("    {} --> {}[{}]", writer, reviewer, reviewer),
        format!("    {} -- needs_revision --> {}", reviewer, writer),
        format!("    {} -- approved --> finish([end])", reviewer),
    ]
    .join("\n")
}
