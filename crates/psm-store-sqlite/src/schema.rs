//! SQL schema for the BVL SQLite artifact.
//!
//! Applied once per run by [`DatabaseManager::init_schema`]. Every statement
//! is `IF NOT EXISTS`, so re-applying it to a populated file leaves the data
//! alone.
//!
//! [`DatabaseManager::init_schema`]: crate::DatabaseManager::init_schema

/// Full schema DDL.
pub const SCHEMA: &str = r#"
-- Link rows may arrive before their parents; references are not enforced.
PRAGMA foreign_keys = OFF;

CREATE TABLE IF NOT EXISTS bvl_meta (
    key   TEXT PRIMARY KEY NOT NULL,
    value TEXT
);

-- Single as-of snapshot row.
CREATE TABLE IF NOT EXISTS bvl_stand (
    id           INTEGER PRIMARY KEY CHECK (id = 1),
    stand        TEXT,
    hinweis      TEXT,
    payload_json TEXT
);

CREATE TABLE IF NOT EXISTS bvl_mittel (
    kennr             TEXT PRIMARY KEY NOT NULL,
    mittelname        TEXT,
    zulassungsnummer  TEXT,
    zulassungsende    TEXT,
    zulassungsinhaber TEXT,
    parallelimporteur TEXT,
    formulierung      TEXT,
    antragssteller    TEXT,
    stand             TEXT,
    zusatzinfo        TEXT,
    auflage           TEXT,
    payload_json      TEXT
);

CREATE TABLE IF NOT EXISTS bvl_awg (
    awg_id       TEXT PRIMARY KEY NOT NULL,
    kennr        TEXT REFERENCES bvl_mittel(kennr),
    awg_titel    TEXT,
    awg_nr       TEXT,
    gueltig_bis  TEXT,
    payload_json TEXT
);

CREATE TABLE IF NOT EXISTS bvl_awg_kultur (
    awg_id      TEXT REFERENCES bvl_awg(awg_id),
    kultur_kode TEXT,
    kultur_text TEXT,
    UNIQUE (awg_id, kultur_kode)
);

CREATE TABLE IF NOT EXISTS bvl_awg_schadorg (
    awg_id        TEXT REFERENCES bvl_awg(awg_id),
    schadorg_kode TEXT,
    schadorg_text TEXT,
    UNIQUE (awg_id, schadorg_kode)
);

CREATE TABLE IF NOT EXISTS bvl_awg_aufwand (
    awg_id               TEXT REFERENCES bvl_awg(awg_id),
    aufwandmenge         REAL,
    aufwandmenge_einheit TEXT,
    aufwandmenge_min     REAL,
    aufwandmenge_max     REAL,
    wassermenge          REAL,
    wassermenge_einheit  TEXT
);

CREATE TABLE IF NOT EXISTS bvl_awg_wartezeit (
    awg_id         TEXT REFERENCES bvl_awg(awg_id),
    kultur_kode    TEXT,
    wartezeit_tage INTEGER,
    wartezeit_text TEXT
);

CREATE TABLE IF NOT EXISTS bvl_wirkstoff (
    wirkstoff_kode TEXT PRIMARY KEY NOT NULL,
    wirkstoff_name TEXT,
    cas_nr         TEXT,
    beschreibung   TEXT,
    payload_json   TEXT
);

-- Reference tables for the enrichment pass.
CREATE TABLE IF NOT EXISTS bvl_ghs_hinweis (
    hinweis_kode TEXT PRIMARY KEY NOT NULL,
    hinweis_text TEXT
);

CREATE TABLE IF NOT EXISTS bvl_hersteller (
    hersteller_name TEXT PRIMARY KEY NOT NULL,
    website         TEXT,
    ort             TEXT,
    land            TEXT
);

-- Link tables. The display column of each starts NULL and is filled by
-- the enrichment pass.
CREATE TABLE IF NOT EXISTS bvl_mittel_wirkstoff (
    kennr          TEXT NOT NULL,
    wirkstoff_kode TEXT NOT NULL,
    wirkstoff_name TEXT,
    gehalt         REAL,
    gehalt_einheit TEXT,
    PRIMARY KEY (kennr, wirkstoff_kode)
);

CREATE TABLE IF NOT EXISTS bvl_mittel_ghs (
    kennr        TEXT NOT NULL,
    hinweis_kode TEXT NOT NULL,
    hinweis_text TEXT,
    PRIMARY KEY (kennr, hinweis_kode)
);

CREATE TABLE IF NOT EXISTS bvl_mittel_vertrieb (
    kennr           TEXT NOT NULL,
    hersteller_name TEXT,
    rolle           TEXT,
    website         TEXT,
    UNIQUE (kennr, hersteller_name, rolle)
);

CREATE INDEX IF NOT EXISTS awg_kennr_idx              ON bvl_awg(kennr);
CREATE INDEX IF NOT EXISTS awg_kultur_awg_idx         ON bvl_awg_kultur(awg_id);
CREATE INDEX IF NOT EXISTS awg_schadorg_awg_idx       ON bvl_awg_schadorg(awg_id);
CREATE INDEX IF NOT EXISTS awg_aufwand_awg_idx        ON bvl_awg_aufwand(awg_id);
CREATE INDEX IF NOT EXISTS awg_wartezeit_awg_idx      ON bvl_awg_wartezeit(awg_id);
CREATE INDEX IF NOT EXISTS mittel_wirkstoff_kode_idx  ON bvl_mittel_wirkstoff(wirkstoff_kode);
CREATE INDEX IF NOT EXISTS mittel_ghs_kode_idx        ON bvl_mittel_ghs(hinweis_kode);
CREATE INDEX IF NOT EXISTS mittel_vertrieb_kennr_idx  ON bvl_mittel_vertrieb(kennr);

-- One row per product with its enriched children folded in.
CREATE VIEW IF NOT EXISTS bvl_mittel_extras AS
SELECT
    m.kennr,
    m.mittelname,
    m.formulierung,
    m.zulassungsinhaber,
    m.zulassungsende,
    (SELECT group_concat(coalesce(mw.wirkstoff_name, mw.wirkstoff_kode), '; ')
       FROM bvl_mittel_wirkstoff mw WHERE mw.kennr = m.kennr) AS wirkstoffe,
    (SELECT group_concat(g.hinweis_kode, '; ')
       FROM bvl_mittel_ghs g WHERE g.kennr = m.kennr)         AS ghs_kodes,
    (SELECT group_concat(g.hinweis_text, '; ')
       FROM bvl_mittel_ghs g WHERE g.kennr = m.kennr)         AS ghs_texte,
    (SELECT group_concat(v.hersteller_name, '; ')
       FROM bvl_mittel_vertrieb v WHERE v.kennr = m.kennr)    AS vertrieb,
    (SELECT count(*) FROM bvl_awg a WHERE a.kennr = m.kennr)  AS awg_count
FROM bvl_mittel m;

PRAGMA user_version = 1;
"#;
