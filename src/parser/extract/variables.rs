use crate::db::VariableRow;
use crate::parser::lines;

/// Parameter comparisons from a variables block (coordinator or VC).
pub fn extract(block: &str, system: &str, cluster: &str) -> Vec<VariableRow> {
    lines::param_rows(block)
        .into_iter()
        .map(|p| VariableRow {
            system_name: system.to_string(),
            cluster_name: cluster.to_string(),
            ip_address: p.ip,
            var_name: p.name,
            var_reference: p.reference,
            config_file: p.config_file,
            var_actual: p.actual,
        })
        .collect()
}

// ── Tests ──
