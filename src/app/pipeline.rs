//! Shared "fit pipeline" logic used by the `fit` command and tests.
//!
//! The workflow is:
//! load tables -> prepare one sample per category -> fit/select -> assemble document -> write once
//!
//! Everything up to the write is a pure function of the two tables, so a
//! failure in any category aborts before anything touches the output path.

use rayon::prelude::*;
use tracing::{info, warn};

use crate::domain::{Category, PipelineConfig, RegressionDocument, Sample};
use crate::error::{RegressionError, Result};
use crate::fit::fitter::MIN_FIT_ROWS;
use crate::fit::selection::{FitSelection, fit_and_select};
use crate::io::ingest::{RatingTable, load_rating_table};
use crate::math::interp::{BridgeTable, RangeClamps};

/// Column shared by both tables, used to chain indirect relationships.
pub const BRIDGE_COLUMN: &str = "chess_com_blitz";

/// Where a category's `(x, y)` sample comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleSource {
    /// Two columns of the cross table.
    Direct { x: &'static str, y: &'static str },
    /// `x` from the cross table; `y` interpolated from the internal table's
    /// `target` column at each row's bridge value.
    Bridged {
        x: &'static str,
        bridge: &'static str,
        target: &'static str,
    },
}

/// How one category is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryPlan {
    pub category: Category,
    pub source: SampleSource,
}

/// The four categories, in output order.
pub const CATEGORY_PLANS: [CategoryPlan; 4] = [
    CategoryPlan {
        category: Category::Blitz,
        source: SampleSource::Direct {
            x: "lichess_blitz",
            y: "chess_com_blitz",
        },
    },
    CategoryPlan {
        category: Category::Bullet,
        source: SampleSource::Bridged {
            x: "lichess_bullet",
            bridge: BRIDGE_COLUMN,
            target: "chess_com_bullet",
        },
    },
    CategoryPlan {
        category: Category::Rapid,
        source: SampleSource::Bridged {
            x: "lichess_rapid",
            bridge: BRIDGE_COLUMN,
            target: "chess_com_rapid",
        },
    },
    CategoryPlan {
        category: Category::Classical,
        source: SampleSource::Direct {
            x: "lichess_classical",
            y: "chess_com_blitz",
        },
    },
];

/// The two source tables.
#[derive(Debug, Clone)]
pub struct SourceTables {
    /// Platform-1 ratings against the platform-2 bridge scale.
    pub cross: RatingTable,
    /// Platform-2 internal pairs (bridge scale against other time controls).
    pub internal: RatingTable,
}

impl SourceTables {
    /// Check every column any plan needs, before fitting anything.
    pub fn validate_schema(&self) -> Result<()> {
        for plan in &CATEGORY_PLANS {
            match plan.source {
                SampleSource::Direct { x, y } => self.cross.require_columns(&[x, y]),
                SampleSource::Bridged { x, bridge, target } => self
                    .cross
                    .require_columns(&[x, bridge])
                    .and_then(|()| self.internal.require_columns(&[bridge, target])),
            }
            .map_err(|e| e.in_category(plan.category))?;
        }
        Ok(())
    }
}

/// A category's sample plus how it was built.
#[derive(Debug, Clone)]
pub struct PreparedSample {
    pub sample: Sample,
    /// Bridged queries that fell outside the bridge range (always zero for direct plans).
    pub clamps: RangeClamps,
    pub bridged: bool,
}

/// Fit output for one category.
#[derive(Debug, Clone)]
pub struct CategoryFit {
    pub category: Category,
    pub prepared: PreparedSample,
    pub selection: FitSelection,
}

/// All computed outputs of a single `rb fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub document: RegressionDocument,
    /// Per-category details, in category order.
    pub fits: Vec<CategoryFit>,
}

/// Build one category's sample from the source tables.
pub fn prepare_sample(plan: &CategoryPlan, tables: &SourceTables) -> Result<PreparedSample> {
    match plan.source {
        SampleSource::Direct { x, y } => {
            let (xs, ys) = tables.cross.complete_pairs(x, y)?;
            Ok(PreparedSample {
                sample: checked_sample(xs, ys)?,
                clamps: RangeClamps::default(),
                bridged: false,
            })
        }
        SampleSource::Bridged { x, bridge, target } => {
            let (xs, queries) = tables.cross.complete_pairs(x, bridge)?;
            let (known_bridge, known_target) = tables.internal.complete_pairs(bridge, target)?;
            if known_bridge.is_empty() {
                return Err(RegressionError::InsufficientData {
                    needed: 1,
                    actual: 0,
                });
            }
            if xs.len() < MIN_FIT_ROWS {
                return Err(RegressionError::InsufficientData {
                    needed: MIN_FIT_ROWS,
                    actual: xs.len(),
                });
            }

            let table = BridgeTable::new(&known_bridge, &known_target)?;
            let (ys, clamps) = table.interpolate_all(&queries);
            if clamps.total() > 0 {
                let (lo, hi) = table.range();
                warn!(
                    category = %plan.category,
                    below = clamps.below,
                    above = clamps.above,
                    bridge_min = lo,
                    bridge_max = hi,
                    "bridge queries outside the tabulated range were clamped"
                );
            }

            Ok(PreparedSample {
                sample: checked_sample(xs, ys)?,
                clamps,
                bridged: true,
            })
        }
    }
}

/// Prepare and fit every category.
///
/// Categories are independent and are fitted in parallel; output order follows
/// [`CATEGORY_PLANS`]. Any failure aborts the whole run.
pub fn fit_categories(tables: &SourceTables) -> Result<Vec<CategoryFit>> {
    tables.validate_schema()?;

    CATEGORY_PLANS
        .par_iter()
        .map(|plan| fit_category(plan, tables).map_err(|e| e.in_category(plan.category)))
        .collect()
}

fn fit_category(plan: &CategoryPlan, tables: &SourceTables) -> Result<CategoryFit> {
    let prepared = prepare_sample(plan, tables)?;
    let selection = fit_and_select(&prepared.sample)?;
    info!(
        category = %plan.category,
        n = prepared.sample.len(),
        family = %selection.best.kind,
        aic = selection.best.aic,
        "selected regression"
    );
    Ok(CategoryFit {
        category: plan.category,
        prepared,
        selection,
    })
}

/// Build the regressions document from the two source tables.
pub fn build_regressions(tables: &SourceTables) -> Result<RegressionDocument> {
    Ok(assemble(&fit_categories(tables)?))
}

/// Execute the full pipeline: load, fit, then write the document once.
pub fn run_fit(config: &PipelineConfig) -> Result<RunOutput> {
    let tables = SourceTables {
        cross: load_rating_table("cross", &config.cross_table)?,
        internal: load_rating_table("internal", &config.internal_table)?,
    };

    let fits = fit_categories(&tables)?;
    let document = assemble(&fits);
    crate::io::document::write_document(&config.output, &document)?;

    Ok(RunOutput { document, fits })
}

fn assemble(fits: &[CategoryFit]) -> RegressionDocument {
    fits.iter()
        .map(|f| (f.category, f.selection.regression()))
        .collect()
}

fn checked_sample(x: Vec<f64>, y: Vec<f64>) -> Result<Sample> {
    if x.len() < MIN_FIT_ROWS {
        return Err(RegressionError::InsufficientData {
            needed: MIN_FIT_ROWS,
            actual: x.len(),
        });
    }
    Sample::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FamilyKind;
    use approx::assert_relative_eq;
    use std::fs;
    use std::path::PathBuf;

    fn ratings() -> Vec<f64> {
        (0..6).map(|i| 1000.0 + 200.0 * i as f64).collect()
    }

    fn col(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    fn identity_tables() -> SourceTables {
        let r = ratings();
        SourceTables {
            cross: RatingTable::from_columns(
                "cross",
                vec![
                    ("chess_com_blitz", col(&r)),
                    ("lichess_blitz", col(&r)),
                    ("lichess_bullet", col(&r)),
                    ("lichess_rapid", col(&r)),
                    ("lichess_classical", col(&r)),
                ],
            )
            .unwrap(),
            internal: RatingTable::from_columns(
                "internal",
                vec![
                    ("chess_com_blitz", col(&r)),
                    ("chess_com_bullet", col(&r)),
                    ("chess_com_rapid", col(&r)),
                ],
            )
            .unwrap(),
        }
    }

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("rb-pipeline-{tag}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn identity_tables_give_unit_lines() {
        let doc = build_regressions(&identity_tables()).unwrap();
        assert_eq!(doc.keys().copied().collect::<Vec<_>>(), Category::ALL.to_vec());
        for regression in doc.values() {
            assert_eq!(regression.kind, FamilyKind::Linear);
            assert_relative_eq!(regression.params[0], 1.0, max_relative = 1e-9);
            assert_relative_eq!(regression.params[1], 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn bridged_sample_interpolates_target_column() {
        let mut tables = identity_tables();
        let r = ratings();
        // Internal table: bullet runs 100 below blitz.
        let bullet: Vec<f64> = r.iter().map(|v| v - 100.0).collect();
        tables.internal = RatingTable::from_columns(
            "internal",
            vec![
                ("chess_com_blitz", col(&r)),
                ("chess_com_bullet", col(&bullet)),
                ("chess_com_rapid", col(&r)),
            ],
        )
        .unwrap();
        // Cross table: bridge value sits 50 above the lichess bullet rating.
        let bridge: Vec<f64> = r.iter().map(|v| v + 50.0).collect();
        tables.cross = RatingTable::from_columns(
            "cross",
            vec![
                ("chess_com_blitz", col(&bridge)),
                ("lichess_blitz", col(&r)),
                ("lichess_bullet", col(&r)),
                ("lichess_rapid", col(&r)),
                ("lichess_classical", col(&r)),
            ],
        )
        .unwrap();

        let prepared = prepare_sample(&CATEGORY_PLANS[1], &tables).unwrap();
        assert!(prepared.bridged);
        // The last bridge query (2050) is beyond the table's 2000 and clamps.
        assert_eq!(prepared.clamps, RangeClamps { below: 0, above: 1 });
        assert_eq!(prepared.sample.y()[0], 950.0);
        assert_eq!(prepared.sample.y()[5], 1900.0);
    }

    #[test]
    fn bridged_rows_need_both_x_and_bridge() {
        let mut tables = identity_tables();
        let r = ratings();
        let mut bullet = col(&r);
        bullet[0] = None;
        bullet[3] = None;
        tables.cross = RatingTable::from_columns(
            "cross",
            vec![
                ("chess_com_blitz", col(&r)),
                ("lichess_blitz", col(&r)),
                ("lichess_bullet", bullet),
                ("lichess_rapid", col(&r)),
                ("lichess_classical", col(&r)),
            ],
        )
        .unwrap();
        let prepared = prepare_sample(&CATEGORY_PLANS[1], &tables).unwrap();
        assert_eq!(prepared.sample.x(), &[1200.0, 1400.0, 1800.0, 2000.0]);
        assert_eq!(prepared.sample.y(), &[1200.0, 1400.0, 1800.0, 2000.0]);
    }

    #[test]
    fn missing_column_fails_before_fitting() {
        let mut tables = identity_tables();
        let r = ratings();
        tables.internal = RatingTable::from_columns(
            "internal",
            vec![("chess_com_blitz", col(&r)), ("chess_com_bullet", col(&r))],
        )
        .unwrap();

        let err = build_regressions(&tables).unwrap_err();
        match err {
            RegressionError::Category { category, source } => {
                assert_eq!(category, Category::Rapid);
                assert!(matches!(*source, RegressionError::InputSchema { ref column, .. } if column == "chess_com_rapid"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn sparse_category_aborts_the_whole_run() {
        let mut tables = identity_tables();
        let r = ratings();
        let mut classical = vec![None; r.len()];
        classical[2] = Some(1400.0);
        tables.cross = RatingTable::from_columns(
            "cross",
            vec![
                ("chess_com_blitz", col(&r)),
                ("lichess_blitz", col(&r)),
                ("lichess_bullet", col(&r)),
                ("lichess_rapid", col(&r)),
                ("lichess_classical", classical),
            ],
        )
        .unwrap();

        let err = build_regressions(&tables).unwrap_err();
        assert!(matches!(
            err,
            RegressionError::Category { category: Category::Classical, .. }
        ));
        assert!(matches!(
            err.root(),
            RegressionError::InsufficientData { needed: 2, actual: 1 }
        ));
    }

    #[test]
    fn raw_evaluation_is_not_clamped() {
        let mut tables = identity_tables();
        let r = ratings();
        // Steep relation: chess.com = 1.5 * lichess - 1200, negative below 800.
        let y: Vec<f64> = r.iter().map(|v| 1.5 * v - 1200.0).collect();
        tables.cross = RatingTable::from_columns(
            "cross",
            vec![
                ("chess_com_blitz", col(&y)),
                ("lichess_blitz", col(&r)),
                ("lichess_bullet", col(&r)),
                ("lichess_rapid", col(&r)),
                ("lichess_classical", col(&r)),
            ],
        )
        .unwrap();
        let doc = build_regressions(&tables).unwrap();
        let blitz = &doc[&Category::Blitz];
        assert_eq!(blitz.kind, FamilyKind::Linear);
        assert!(blitz.evaluate(400.0) < 0.0);
    }

    #[test]
    fn run_fit_writes_document_from_csv_files() {
        let dir = scratch_dir("run");
        let cross = dir.join("lichess_to_chess_com_data.csv");
        let internal = dir.join("chess_com_to_chess_com_data.csv");
        let output = dir.join("regressions.json");

        let mut cross_csv = String::from("chess_com_blitz,lichess_blitz,lichess_bullet,lichess_rapid,lichess_classical\n");
        let mut internal_csv = String::from("chess_com_blitz,chess_com_bullet,chess_com_rapid,uscf,fide\n");
        for v in ratings() {
            cross_csv.push_str(&format!("{v},{v},{v},{v},{v}\n"));
            internal_csv.push_str(&format!("{v},{v},{v},,\n"));
        }
        fs::write(&cross, cross_csv).unwrap();
        fs::write(&internal, internal_csv).unwrap();

        let config = PipelineConfig {
            cross_table: cross,
            internal_table: internal,
            output: output.clone(),
            summary: false,
        };
        let run = run_fit(&config).unwrap();
        assert_eq!(run.fits.len(), 4);

        let written = crate::io::document::read_document(&output).unwrap();
        assert_eq!(written, run.document);
        let blitz = &written[&Category::Blitz];
        assert_eq!(blitz.kind, FamilyKind::Linear);
        assert_relative_eq!(blitz.params[0], 1.0, max_relative = 1e-9);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn failed_run_leaves_no_output() {
        let dir = scratch_dir("failed");
        let cross = dir.join("cross.csv");
        let internal = dir.join("internal.csv");
        let output = dir.join("regressions.json");
        fs::write(&cross, "chess_com_blitz,lichess_blitz\n1000,1000\n1200,1200\n").unwrap();
        fs::write(&internal, "chess_com_blitz,chess_com_bullet,chess_com_rapid\n1000,900,1000\n").unwrap();

        let config = PipelineConfig {
            cross_table: cross,
            internal_table: internal,
            output: output.clone(),
            summary: false,
        };
        let err = run_fit(&config).unwrap_err();
        assert!(matches!(err.root(), RegressionError::InputSchema { .. }));
        assert!(!output.exists());
        fs::remove_dir_all(dir).ok();
    }
}
