use std::path::Path;

use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};

pub const DEFAULT_DB_PATH: &str = "data/inspect.sqlite";

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

#[cfg(test)]
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

/// Drop and recreate every table. A run always starts from an empty store.
pub fn reset_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        DROP TABLE IF EXISTS files;
        DROP TABLE IF EXISTS machines;
        DROP TABLE IF EXISTS machine_using;
        DROP TABLE IF EXISTS clusters_disk_using;
        DROP TABLE IF EXISTS clusters_process;
        DROP TABLE IF EXISTS clusters_logs;
        DROP TABLE IF EXISTS auto_start;
        DROP TABLE IF EXISTS cluster_variables;
        DROP TABLE IF EXISTS data_clusters;
        DROP TABLE IF EXISTS instances;
        DROP TABLE IF EXISTS sys_clusters;
        ",
    )?;
    init_schema(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS files (
            id          INTEGER PRIMARY KEY,
            system_name TEXT,
            filename    TEXT NOT NULL,
            fullpath    TEXT NOT NULL,
            imported_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime'))
        );

        CREATE TABLE IF NOT EXISTS machines (
            id                INTEGER PRIMARY KEY,
            system_name       TEXT NOT NULL,
            cluster_name      TEXT NOT NULL,
            ip_address        TEXT NOT NULL,
            os_version        TEXT,
            hostname          TEXT,
            cpu_model_name    TEXT,
            cpu_logic_core    INTEGER,
            cpu_physical_core INTEGER,
            serverip_list     TEXT,
            UNIQUE(system_name, ip_address)
        );

        CREATE TABLE IF NOT EXISTS machine_using (
            id              INTEGER PRIMARY KEY,
            system_name     TEXT NOT NULL,
            cluster_name    TEXT NOT NULL,
            ip_address      TEXT NOT NULL,
            mem_total       TEXT,
            mem_used        TEXT,
            mem_free        TEXT,
            mem_shared      TEXT,
            mem_buff_cache  TEXT,
            mem_available   TEXT,
            swap_total      TEXT,
            swap_used       TEXT,
            swap_free       TEXT,
            disk_filesystem TEXT,
            disk_size       TEXT,
            disk_used       TEXT,
            disk_avail      TEXT,
            disk_use_per    TEXT,
            disk_mounted    TEXT,
            UNIQUE(system_name, ip_address)
        );

        CREATE TABLE IF NOT EXISTS clusters_disk_using (
            id           INTEGER PRIMARY KEY,
            system_name  TEXT NOT NULL,
            cluster_name TEXT NOT NULL,
            disk_total   TEXT,
            disk_used    TEXT,
            disk_avail   TEXT,
            disk_use_per TEXT,
            UNIQUE(system_name, cluster_name)
        );

        CREATE TABLE IF NOT EXISTS clusters_process (
            id           INTEGER PRIMARY KEY,
            system_name  TEXT NOT NULL,
            cluster_name TEXT NOT NULL,
            ip_address   TEXT,
            process_cmd  TEXT,
            UNIQUE(system_name, cluster_name, ip_address, process_cmd)
        );

        CREATE TABLE IF NOT EXISTS clusters_logs (
            id           INTEGER PRIMARY KEY,
            system_name  TEXT NOT NULL,
            cluster_name TEXT NOT NULL,
            ip_address   TEXT,
            log_used     TEXT,
            log_path     TEXT
        );

        CREATE TABLE IF NOT EXISTS auto_start (
            id            INTEGER PRIMARY KEY,
            system_name   TEXT NOT NULL,
            cluster_name  TEXT NOT NULL,
            ip_address    TEXT,
            process_start TEXT
        );

        CREATE TABLE IF NOT EXISTS cluster_variables (
            id            INTEGER PRIMARY KEY,
            system_name   TEXT NOT NULL,
            cluster_name  TEXT NOT NULL,
            ip_address    TEXT,
            var_name      TEXT,
            var_reference TEXT,
            config_file   TEXT,
            var_actual    TEXT
        );

        CREATE TABLE IF NOT EXISTS data_clusters (
            id               INTEGER PRIMARY KEY,
            system_name      TEXT NOT NULL,
            cluster_name     TEXT NOT NULL,
            cluster_state    TEXT,
            cluster_mode     TEXT,
            databases_count  TEXT,
            tables_count     TEXT,
            views_count      TEXT,
            procs_count      TEXT,
            funcs_count      TEXT,
            ddl_event        TEXT,
            dml_event        TEXT,
            dmlstorage_event TEXT,
            UNIQUE(system_name, cluster_name)
        );

        CREATE TABLE IF NOT EXISTS instances (
            id           INTEGER PRIMARY KEY,
            system_name  TEXT NOT NULL,
            cluster_name TEXT NOT NULL,
            namenode     TEXT,
            ip_address   TEXT,
            gcware       TEXT,
            gcluster     TEXT,
            gnode        TEXT,
            syncserver   TEXT,
            datastate    TEXT
        );

        CREATE TABLE IF NOT EXISTS sys_clusters (
            id             INTEGER PRIMARY KEY,
            system_name    TEXT NOT NULL,
            ma_one_ip      TEXT,
            gbase_version  TEXT,
            failover_info  TEXT,
            crontab_always TEXT,
            UNIQUE(system_name)
        );
        ",
    )?;
    Ok(())
}

// ── File index ──

pub struct FileRow {
    pub system_name: String,
    pub filename: String,
    pub fullpath: String,
}

pub fn insert_files(conn: &Connection, files: &[FileRow]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt =
            tx.prepare("INSERT INTO files (system_name, filename, fullpath) VALUES (?1, ?2, ?3)")?;
        for f in files {
            count += stmt.execute(rusqlite::params![f.system_name, f.filename, f.fullpath])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

pub fn fetch_files(conn: &Connection) -> Result<Vec<(i64, String, String)>> {
    let mut stmt = conn.prepare("SELECT id, filename, fullpath FROM files ORDER BY id")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Extracted rows ──

#[derive(Debug, Default, Clone)]
pub struct MachineRow {
    pub system_name: String,
    pub cluster_name: String,
    pub ip_address: String,
    pub os_version: Option<String>,
    pub hostname: Option<String>,
    pub cpu_model_name: Option<String>,
    pub cpu_logic_core: Option<String>,
    pub cpu_physical_core: Option<String>,
    pub serverip_list: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct MachineUsageRow {
    pub system_name: String,
    pub cluster_name: String,
    pub ip_address: String,
    pub mem_total: Option<String>,
    pub mem_used: Option<String>,
    pub mem_free: Option<String>,
    pub mem_shared: Option<String>,
    pub mem_buff_cache: Option<String>,
    pub mem_available: Option<String>,
    pub swap_total: Option<String>,
    pub swap_used: Option<String>,
    pub swap_free: Option<String>,
    pub disk_filesystem: Option<String>,
    pub disk_size: Option<String>,
    pub disk_used: Option<String>,
    pub disk_avail: Option<String>,
    pub disk_use_per: Option<String>,
    pub disk_mounted: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ClusterDiskRow {
    pub system_name: String,
    pub cluster_name: String,
    pub disk_total: String,
    pub disk_used: String,
    pub disk_avail: String,
    pub disk_use_per: String,
}

#[derive(Debug, Clone)]
pub struct ProcessRow {
    pub system_name: String,
    pub cluster_name: String,
    pub ip_address: String,
    pub process_cmd: String,
}

#[derive(Debug, Clone)]
pub struct LogRow {
    pub system_name: String,
    pub cluster_name: String,
    pub ip_address: String,
    pub log_used: String,
    pub log_path: String,
}

#[derive(Debug, Clone)]
pub struct AutoStartRow {
    pub system_name: String,
    pub cluster_name: String,
    pub ip_address: String,
    pub process_start: String,
}

#[derive(Debug, Clone)]
pub struct VariableRow {
    pub system_name: String,
    pub cluster_name: String,
    pub ip_address: String,
    pub var_name: String,
    pub var_reference: String,
    pub config_file: String,
    pub var_actual: String,
}

#[derive(Debug, Default, Clone)]
pub struct DataClusterRow {
    pub system_name: String,
    pub cluster_name: String,
    pub cluster_state: String,
    pub cluster_mode: String,
    pub databases_count: String,
    pub tables_count: String,
    pub views_count: String,
    pub procs_count: String,
    pub funcs_count: String,
    pub ddl_event: String,
    pub dml_event: String,
    pub dmlstorage_event: String,
}

#[derive(Debug, Default, Clone)]
pub struct InstanceRow {
    pub system_name: String,
    pub cluster_name: String,
    pub namenode: String,
    pub ip_address: String,
    pub gcware: Option<String>,
    pub gcluster: Option<String>,
    pub gnode: Option<String>,
    pub syncserver: Option<String>,
    pub datastate: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct SystemRow {
    pub system_name: String,
    pub ma_one_ip: Option<String>,
    pub gbase_version: Option<String>,
    pub failover_info: Option<String>,
    pub crontab_always: Option<String>,
}

/// Everything extracted from one dump file.
#[derive(Default)]
pub struct FileExtract {
    pub system_name: String,
    pub machines: Vec<MachineRow>,
    pub usage: Vec<MachineUsageRow>,
    pub cluster_disks: Vec<ClusterDiskRow>,
    pub processes: Vec<ProcessRow>,
    pub logs: Vec<LogRow>,
    pub autostart: Vec<AutoStartRow>,
    pub variables: Vec<VariableRow>,
    pub data_clusters: Vec<DataClusterRow>,
    pub instances: Vec<InstanceRow>,
    pub system: Option<SystemRow>,
}

/// Persist one file's extraction in a single transaction. Machine and usage
/// rows are seeded with INSERT OR IGNORE on (system_name, ip_address), then
/// their detail columns are filled with UPDATE keyed by the merge IP.
pub fn save_extract(conn: &Connection, data: &FileExtract) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut seed_machine = tx.prepare(
            "INSERT OR IGNORE INTO machines (system_name, cluster_name, ip_address)
             VALUES (?1, ?2, ?3)",
        )?;
        let mut update_machine = tx.prepare(
            "UPDATE machines
             SET os_version = ?1, hostname = ?2, cpu_model_name = ?3,
                 cpu_logic_core = ?4, cpu_physical_core = ?5, serverip_list = ?6
             WHERE ip_address = ?7",
        )?;
        for m in &data.machines {
            seed_machine.execute(rusqlite::params![
                m.system_name,
                m.cluster_name,
                m.ip_address
            ])?;
            update_machine.execute(rusqlite::params![
                m.os_version,
                m.hostname,
                m.cpu_model_name,
                m.cpu_logic_core,
                m.cpu_physical_core,
                m.serverip_list,
                m.ip_address,
            ])?;
        }

        let mut seed_usage = tx.prepare(
            "INSERT OR IGNORE INTO machine_using (system_name, cluster_name, ip_address)
             VALUES (?1, ?2, ?3)",
        )?;
        let mut update_usage = tx.prepare(
            "UPDATE machine_using
             SET mem_total = ?1, mem_used = ?2, mem_free = ?3, mem_shared = ?4,
                 mem_buff_cache = ?5, mem_available = ?6,
                 swap_total = ?7, swap_used = ?8, swap_free = ?9,
                 disk_filesystem = ?10, disk_size = ?11, disk_used = ?12,
                 disk_avail = ?13, disk_use_per = ?14, disk_mounted = ?15
             WHERE ip_address = ?16",
        )?;
        for u in &data.usage {
            seed_usage.execute(rusqlite::params![
                u.system_name,
                u.cluster_name,
                u.ip_address
            ])?;
            update_usage.execute(rusqlite::params![
                u.mem_total,
                u.mem_used,
                u.mem_free,
                u.mem_shared,
                u.mem_buff_cache,
                u.mem_available,
                u.swap_total,
                u.swap_used,
                u.swap_free,
                u.disk_filesystem,
                u.disk_size,
                u.disk_used,
                u.disk_avail,
                u.disk_use_per,
                u.disk_mounted,
                u.ip_address,
            ])?;
        }

        let mut disk_stmt = tx.prepare(
            "INSERT OR IGNORE INTO clusters_disk_using
             (system_name, cluster_name, disk_total, disk_used, disk_avail, disk_use_per)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for d in &data.cluster_disks {
            disk_stmt.execute(rusqlite::params![
                d.system_name,
                d.cluster_name,
                d.disk_total,
                d.disk_used,
                d.disk_avail,
                d.disk_use_per,
            ])?;
        }

        let mut proc_stmt = tx.prepare(
            "INSERT OR IGNORE INTO clusters_process
             (system_name, cluster_name, ip_address, process_cmd)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for p in &data.processes {
            proc_stmt.execute(rusqlite::params![
                p.system_name,
                p.cluster_name,
                p.ip_address,
                p.process_cmd,
            ])?;
        }

        let mut log_stmt = tx.prepare(
            "INSERT INTO clusters_logs
             (system_name, cluster_name, ip_address, log_used, log_path)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for l in &data.logs {
            log_stmt.execute(rusqlite::params![
                l.system_name,
                l.cluster_name,
                l.ip_address,
                l.log_used,
                l.log_path,
            ])?;
        }

        let mut auto_stmt = tx.prepare(
            "INSERT INTO auto_start (system_name, cluster_name, ip_address, process_start)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for a in &data.autostart {
            auto_stmt.execute(rusqlite::params![
                a.system_name,
                a.cluster_name,
                a.ip_address,
                a.process_start,
            ])?;
        }

        let mut var_stmt = tx.prepare(
            "INSERT INTO cluster_variables
             (system_name, cluster_name, ip_address, var_name, var_reference, config_file, var_actual)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for v in &data.variables {
            var_stmt.execute(rusqlite::params![
                v.system_name,
                v.cluster_name,
                v.ip_address,
                v.var_name,
                v.var_reference,
                v.config_file,
                v.var_actual,
            ])?;
        }

        let mut dc_stmt = tx.prepare(
            "INSERT OR IGNORE INTO data_clusters
             (system_name, cluster_name, cluster_state, cluster_mode,
              databases_count, tables_count, views_count, procs_count, funcs_count,
              ddl_event, dml_event, dmlstorage_event)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        )?;
        for dc in &data.data_clusters {
            dc_stmt.execute(rusqlite::params![
                dc.system_name,
                dc.cluster_name,
                dc.cluster_state,
                dc.cluster_mode,
                dc.databases_count,
                dc.tables_count,
                dc.views_count,
                dc.procs_count,
                dc.funcs_count,
                dc.ddl_event,
                dc.dml_event,
                dc.dmlstorage_event,
            ])?;
        }

        let mut ins_stmt = tx.prepare(
            "INSERT INTO instances
             (system_name, cluster_name, namenode, ip_address,
              gcware, gcluster, gnode, syncserver, datastate)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;
        for i in &data.instances {
            ins_stmt.execute(rusqlite::params![
                i.system_name,
                i.cluster_name,
                i.namenode,
                i.ip_address,
                i.gcware,
                i.gcluster,
                i.gnode,
                i.syncserver,
                i.datastate,
            ])?;
        }

        if let Some(s) = &data.system {
            tx.execute(
                "INSERT OR IGNORE INTO sys_clusters
                 (system_name, ma_one_ip, gbase_version, failover_info, crontab_always)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    s.system_name,
                    s.ma_one_ip,
                    s.gbase_version,
                    s.failover_info,
                    s.crontab_always,
                ],
            )?;
        }
    }
    tx.commit()?;
    Ok(())
}

// ── Per-system aggregates ──

pub fn fetch_system_names(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT system_name FROM sys_clusters ORDER BY system_name")?;
    let rows = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn fetch_sys_row(conn: &Connection, system: &str) -> Result<Option<SystemRow>> {
    let row = conn
        .query_row(
            "SELECT system_name, ma_one_ip, gbase_version, failover_info, crontab_always
             FROM sys_clusters WHERE system_name = ?1",
            [system],
            |row| {
                Ok(SystemRow {
                    system_name: row.get(0)?,
                    ma_one_ip: row.get(1)?,
                    gbase_version: row.get(2)?,
                    failover_info: row.get(3)?,
                    crontab_always: row.get(4)?,
                })
            },
        )
        .optional()?;
    Ok(row)
}

/// (all nodes, coordinator nodes) for one system.
pub fn node_counts(conn: &Connection, system: &str) -> Result<(i64, i64)> {
    let all: i64 = conn.query_row(
        "SELECT COUNT(*) FROM machines WHERE system_name = ?1",
        [system],
        |r| r.get(0),
    )?;
    let coor: i64 = conn.query_row(
        "SELECT COUNT(*) FROM machines WHERE system_name = ?1 AND cluster_name = 'coor'",
        [system],
        |r| r.get(0),
    )?;
    Ok((all, coor))
}

pub fn data_node_count(conn: &Connection, system: &str) -> Result<i64> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM machines WHERE system_name = ?1 AND cluster_name <> 'coor'",
        [system],
        |r| r.get(0),
    )?;
    Ok(n)
}

pub fn first_cluster_state(conn: &Connection, system: &str) -> Result<Option<(String, String)>> {
    let row = conn
        .query_row(
            "SELECT cluster_state, cluster_mode FROM data_clusters
             WHERE system_name = ?1 LIMIT 1",
            [system],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .optional()?;
    Ok(row)
}

/// Most frequent OS version across the system's nodes.
pub fn majority_os(conn: &Connection, system: &str) -> Result<Option<String>> {
    let row = conn
        .query_row(
            "WITH counts AS (
                SELECT os_version, COUNT(*) AS count
                FROM machines WHERE system_name = ?1
                GROUP BY os_version
             )
             SELECT os_version FROM counts
             WHERE count = (SELECT MAX(count) FROM counts)",
            [system],
            |r| r.get::<_, Option<String>>(0),
        )
        .optional()?;
    Ok(row.flatten())
}

/// Most frequent (model, logical cores, physical cores) triple.
pub fn majority_cpu(
    conn: &Connection,
    system: &str,
) -> Result<Option<(Option<String>, Option<String>, Option<String>)>> {
    let row = conn
        .query_row(
            "WITH counts AS (
                SELECT cpu_model_name, cpu_logic_core, cpu_physical_core, COUNT(*) AS count
                FROM machines WHERE system_name = ?1
                GROUP BY cpu_logic_core, cpu_physical_core
             )
             SELECT cpu_model_name, CAST(cpu_logic_core AS TEXT), CAST(cpu_physical_core AS TEXT)
             FROM counts
             WHERE count = (SELECT MAX(count) FROM counts)",
            [system],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .optional()?;
    Ok(row)
}

/// Most frequent (mem_total, swap_total) for the coordinator role or the
/// data role.
pub fn majority_memory(
    conn: &Connection,
    system: &str,
    coor: bool,
) -> Result<Option<(Option<String>, Option<String>)>> {
    let filter = if coor {
        "cluster_name = 'coor'"
    } else {
        "cluster_name <> 'coor'"
    };
    let sql = format!(
        "WITH counts AS (
            SELECT mem_total, swap_total, COUNT(*) AS count
            FROM machine_using WHERE system_name = ?1 AND {filter}
            GROUP BY mem_total, swap_total
         )
         SELECT mem_total, swap_total FROM counts
         WHERE count = (SELECT MAX(count) FROM counts)"
    );
    let row = conn
        .query_row(&sql, [system], |r| Ok((r.get(0)?, r.get(1)?)))
        .optional()?;
    Ok(row)
}

/// Summed data-node disk totals (total, used). `None` when the system has no
/// data-node disk rows — callers must treat that as insufficient data, not
/// zero.
pub fn data_disk_sums(conn: &Connection, system: &str) -> Result<Option<(f64, f64)>> {
    let (total, used): (Option<f64>, Option<f64>) = conn.query_row(
        "SELECT SUM(disk_total), SUM(disk_used) FROM clusters_disk_using
         WHERE system_name = ?1 AND cluster_name <> 'coor'",
        [system],
        |r| Ok((r.get(0)?, r.get(1)?)),
    )?;
    Ok(total.zip(used))
}

#[derive(Debug, Default)]
pub struct ObjectCounts {
    pub databases: Option<f64>,
    pub tables: Option<f64>,
    pub views: Option<f64>,
    pub procs: Option<f64>,
    pub funcs: Option<f64>,
}

pub fn object_counts(conn: &Connection, system: &str) -> Result<ObjectCounts> {
    let counts = conn.query_row(
        "SELECT SUM(databases_count), SUM(tables_count), SUM(views_count),
                SUM(procs_count), SUM(funcs_count)
         FROM data_clusters WHERE system_name = ?1",
        [system],
        |r| {
            Ok(ObjectCounts {
                databases: r.get(0)?,
                tables: r.get(1)?,
                views: r.get(2)?,
                procs: r.get(3)?,
                funcs: r.get(4)?,
            })
        },
    )?;
    Ok(counts)
}

/// Per-data-node disk usage, for the space table of the report.
#[derive(Debug)]
pub struct DiskNodeRow {
    pub hostname: String,
    pub ip_address: String,
    pub disk_size: String,
    pub disk_used: String,
    pub disk_avail: String,
    pub disk_use_per: String,
}

pub fn disk_node_rows(conn: &Connection, system: &str) -> Result<Vec<DiskNodeRow>> {
    let mut stmt = conn.prepare(
        "SELECT COALESCE(m.hostname, ''), m.ip_address,
                COALESCE(mu.disk_size, ''), COALESCE(mu.disk_used, ''),
                COALESCE(mu.disk_avail, ''), COALESCE(mu.disk_use_per, '')
         FROM machines m JOIN machine_using mu ON m.ip_address = mu.ip_address
         WHERE m.system_name = ?1 AND m.cluster_name <> 'coor'",
    )?;
    let rows = stmt
        .query_map([system], |row| {
            Ok(DiskNodeRow {
                hostname: row.get(0)?,
                ip_address: row.get(1)?,
                disk_size: row.get(2)?,
                disk_used: row.get(3)?,
                disk_avail: row.get(4)?,
                disk_use_per: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// (hostname, cluster_name, ip_address, process_cmd) observations.
pub fn process_rows(conn: &Connection, system: &str) -> Result<Vec<(String, String, String, String)>> {
    let mut stmt = conn.prepare(
        "SELECT COALESCE(m.hostname, ''), cp.cluster_name, cp.ip_address, cp.process_cmd
         FROM clusters_process cp
         JOIN machines m ON m.ip_address = cp.ip_address
         WHERE cp.system_name = ?1",
    )?;
    let rows = stmt
        .query_map([system], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// (hostname, ip_address, log_used, log_path) observations.
pub fn log_rows(conn: &Connection, system: &str) -> Result<Vec<(String, String, String, String)>> {
    let mut stmt = conn.prepare(
        "SELECT COALESCE(m.hostname, ''), cl.ip_address, cl.log_used, cl.log_path
         FROM clusters_logs cl
         JOIN machines m ON m.ip_address = cl.ip_address
         WHERE cl.system_name = ?1",
    )?;
    let rows = stmt
        .query_map([system], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn instance_rows(conn: &Connection, system: &str) -> Result<Vec<InstanceRow>> {
    let mut stmt = conn.prepare(
        "SELECT system_name, cluster_name, COALESCE(namenode, ''), COALESCE(ip_address, ''),
                gcware, gcluster, gnode, syncserver, datastate
         FROM instances WHERE system_name = ?1",
    )?;
    let rows = stmt
        .query_map([system], |row| {
            Ok(InstanceRow {
                system_name: row.get(0)?,
                cluster_name: row.get(1)?,
                namenode: row.get(2)?,
                ip_address: row.get(3)?,
                gcware: row.get(4)?,
                gcluster: row.get(5)?,
                gnode: row.get(6)?,
                syncserver: row.get(7)?,
                datastate: row.get(8)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// (cluster_name, hostname, ip_address, process_start) autostart entries.
pub fn autostart_rows(
    conn: &Connection,
    system: &str,
) -> Result<Vec<(String, String, String, String)>> {
    let mut stmt = conn.prepare(
        "SELECT a.cluster_name, COALESCE(m.hostname, ''), a.ip_address, a.process_start
         FROM auto_start a
         JOIN machines m ON m.ip_address = a.ip_address
         WHERE a.system_name = ?1",
    )?;
    let rows = stmt
        .query_map([system], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// (ip_address, var_name, var_reference, var_actual) comparisons.
pub fn variable_rows(
    conn: &Connection,
    system: &str,
) -> Result<Vec<(String, String, String, String)>> {
    let mut stmt = conn.prepare(
        "SELECT ip_address, var_name, var_reference, var_actual
         FROM cluster_variables WHERE system_name = ?1",
    )?;
    let rows = stmt
        .query_map([system], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn filename_for_system(conn: &Connection, system: &str) -> Result<Option<String>> {
    let row = conn
        .query_row(
            "SELECT filename FROM files WHERE system_name = ?1 LIMIT 1",
            [system],
            |r| r.get(0),
        )
        .optional()?;
    Ok(row)
}

// ── Stats / overview ──

pub struct Stats {
    pub files: usize,
    pub systems: usize,
    pub machines: usize,
    pub processes: usize,
    pub logs: usize,
    pub variables: usize,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let count = |table: &str| -> Result<usize> {
        let n: usize = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?;
        Ok(n)
    };
    Ok(Stats {
        files: count("files")?,
        systems: count("sys_clusters")?,
        machines: count("machines")?,
        processes: count("clusters_process")?,
        logs: count("clusters_logs")?,
        variables: count("cluster_variables")?,
    })
}

pub struct OverviewRow {
    pub system_name: String,
    pub cluster_name: String,
    pub ip_address: String,
    pub hostname: String,
    pub os_version: String,
}

pub fn fetch_overview(conn: &Connection, system: Option<&str>) -> Result<Vec<OverviewRow>> {
    let sql = "SELECT system_name, cluster_name, ip_address,
                      COALESCE(hostname, ''), COALESCE(os_version, '')
               FROM machines
               WHERE (?1 IS NULL OR system_name = ?1)
               ORDER BY system_name, cluster_name, ip_address";
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([system], |row| {
            Ok(OverviewRow {
                system_name: row.get(0)?,
                cluster_name: row.get(1)?,
                ip_address: row.get(2)?,
                hostname: row.get(3)?,
                os_version: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Tests ──
