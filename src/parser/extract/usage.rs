use crate::db::MachineUsageRow;
use crate::parser::lines;
use crate::parser::merge::IpMerged;
use crate::parser::sections;

pub struct Labels {
    pub mem: &'static str,
    pub swap: &'static str,
    pub disk: &'static str,
}

pub const COOR_LABELS: Labels = Labels {
    mem: "* 物理内存使用情况：",
    swap: "* SWAP内存使用情况：",
    disk: "* 管理节点空间使用情况：",
};

// the data block drops the colon on the memory label
pub const DATA_LABELS: Labels = Labels {
    mem: "* 物理内存使用情况",
    swap: "* SWAP使用情况：",
    disk: "* 计算集群各节点空间情况：",
};

/// Point-in-time memory/swap/disk snapshot per node, merged by IP.
pub fn extract(section: &str, system: &str, cluster: &str, labels: &Labels) -> Vec<MachineUsageRow> {
    let mut merged: IpMerged<MachineUsageRow> = IpMerged::new();

    if let Some(text) = sections::field(section, labels.mem) {
        for row in lines::mem_rows(&text) {
            let e = merged.entry(&row.ip);
            let f = |i: usize| row.fields.get(i).cloned();
            e.mem_total = f(0);
            e.mem_used = f(1);
            e.mem_free = f(2);
            e.mem_shared = f(3);
            e.mem_buff_cache = f(4);
            e.mem_available = f(5);
        }
    }

    if let Some(text) = sections::field(section, labels.swap) {
        for row in lines::swap_rows(&text) {
            let e = merged.entry(&row.ip);
            let f = |i: usize| row.fields.get(i).cloned();
            e.swap_total = f(0);
            e.swap_used = f(1);
            e.swap_free = f(2);
        }
    }

    if let Some(text) = sections::field(section, labels.disk) {
        for row in lines::df_rows(&text) {
            let e = merged.entry(&row.ip);
            e.disk_filesystem = Some(row.filesystem);
            e.disk_size = Some(row.size);
            e.disk_used = Some(row.used);
            e.disk_avail = Some(row.avail);
            e.disk_use_per = Some(row.use_per);
            e.disk_mounted = Some(row.mounted);
        }
    }

    merged
        .into_rows()
        .into_iter()
        .map(|(ip, mut row)| {
            row.system_name = system.to_string();
            row.cluster_name = cluster.to_string();
            row.ip_address = ip;
            row
        })
        .collect()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    const SECTION: &str = "\
* 物理内存使用情况：
coor 10.0.0.1: Mem: 257676 80921 1335 4013 175419 170773
* SWAP内存使用情况：
coor 10.0.0.1: Swap: 16383 0 16383
* 管理节点空间使用情况：
coor 10.0.0.1: /dev/mapper/vg-opt 500G 200G 300G 40% /opt
coor 10.0.0.1: broken row
* 下一个标签：
x";

    #[test]
    fn snapshot_merged_by_ip() {
        let rows = extract(SECTION, "SYS-A", "coor", &COOR_LABELS);
        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!(r.ip_address, "10.0.0.1");
        assert_eq!(r.mem_total.as_deref(), Some("257676"));
        assert_eq!(r.mem_available.as_deref(), Some("170773"));
        assert_eq!(r.swap_free.as_deref(), Some("16383"));
        assert_eq!(r.disk_size.as_deref(), Some("500G"));
        assert_eq!(r.disk_mounted.as_deref(), Some("/opt"));
    }

    #[test]
    fn swap_only_node_still_recorded() {
        let text = "* SWAP内存使用情况：\ncoor 10.0.0.9: Swap: 100 0 100";
        let rows = extract(text, "SYS-A", "coor", &COOR_LABELS);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].mem_total.is_none());
        assert_eq!(rows[0].swap_total.as_deref(), Some("100"));
    }
}
