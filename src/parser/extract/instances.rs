use crate::db::InstanceRow;
use crate::parser::lines;
use crate::parser::sections;

/// Coordinator topology: gcware members carry only a gcware status,
/// coordinator members a gcluster status plus datastate. Both land as
/// partial instance rows.
pub fn coor(section: &str, system: &str) -> Vec<InstanceRow> {
    let Some(text) = sections::field(section, "* Coor Cluster拓扑及状态：") else {
        return Vec::new();
    };
    let (gcware, coordinators) = lines::topology_tables(&text);

    let mut rows = Vec::new();
    for g in gcware {
        rows.push(InstanceRow {
            system_name: system.to_string(),
            cluster_name: "coor".to_string(),
            namenode: g.name,
            ip_address: g.ip,
            gcware: Some(g.state),
            ..Default::default()
        });
    }
    for c in coordinators {
        rows.push(InstanceRow {
            system_name: system.to_string(),
            cluster_name: "coor".to_string(),
            namenode: c.name,
            ip_address: c.ip,
            gcluster: Some(c.state),
            datastate: Some(c.datastate),
            ..Default::default()
        });
    }
    rows
}

/// Data-cluster topology: header-indexed node table.
pub fn data(section: &str, system: &str, vc: &str) -> Vec<InstanceRow> {
    let Some(text) = sections::field(section, "* Data Cluster 拓扑及状态：") else {
        return Vec::new();
    };
    lines::node_table(&text)
        .into_iter()
        .map(|n| InstanceRow {
            system_name: system.to_string(),
            cluster_name: vc.to_string(),
            namenode: n.name,
            ip_address: n.ip,
            gnode: Some(n.gnode),
            syncserver: Some(n.syncserver),
            datastate: Some(n.datastate),
            ..Default::default()
        })
        .collect()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coor_partial_rows() {
        let section = "\
* Coor Cluster拓扑及状态：
| GBASE GCWARE CLUSTER INFORMATION |
| gcware1 | 10.0.0.1 | OPEN |
| GBASE COORDINATOR CLUSTER INFORMATION |
| coordinator1 | 10.0.0.1 | OPEN | 0 |
* Coor Cluster Failover信息：
ignored";
        let rows = coor(section, "SYS-A");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].gcware.as_deref(), Some("OPEN"));
        assert!(rows[0].gcluster.is_none());
        assert_eq!(rows[1].gcluster.as_deref(), Some("OPEN"));
        assert_eq!(rows[1].datastate.as_deref(), Some("0"));
    }

    #[test]
    fn data_node_rows() {
        let section = "\
* Data Cluster 拓扑及状态：
| NodeName | IpAddress | gnode | syncserver | DataState |
| node1 | 10.0.0.2 | OPEN | OPEN | 0 |
* Data Cluster DDL&DML&DMLSTORAGE Event信息：
ignored";
        let rows = data(section, "SYS-A", "vc1");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].gnode.as_deref(), Some("OPEN"));
        assert_eq!(rows[0].cluster_name, "vc1");
    }
}
