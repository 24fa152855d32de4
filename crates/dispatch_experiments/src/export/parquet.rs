use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;

use crate::export::FlatRow;

pub(crate) fn export_to_parquet_impl(
    rows: &[FlatRow<'_>],
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    let batch = build_record_batch(rows)?;
    let props = WriterProperties::builder().build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    Ok(())
}

fn build_record_batch(rows: &[FlatRow<'_>]) -> Result<RecordBatch, arrow::error::ArrowError> {
    let schema = Arc::new(parquet_schema());
    let arrays = build_arrays(rows);

    RecordBatch::try_new(schema, arrays)
}

fn parquet_schema() -> Schema {
    Schema::new(vec![
        Field::new("experiment_id", DataType::Utf8, false),
        Field::new("run_id", DataType::UInt64, false),
        Field::new("seed", DataType::UInt64, false),
        Field::new("trials", DataType::UInt64, false),
        Field::new("responders", DataType::UInt64, false),
        Field::new("operators", DataType::UInt64, false),
        Field::new("base_incidents", DataType::UInt64, false),
        Field::new("hangup_threshold_secs", DataType::UInt64, false),
        Field::new("report_range_km", DataType::Float64, false),
        Field::new("trial", DataType::UInt64, false),
        Field::new("pipeline", DataType::Utf8, false),
        Field::new("completed", DataType::UInt64, false),
        Field::new("canceled", DataType::UInt64, false),
        Field::new("self_completed", DataType::UInt64, false),
        Field::new("avg_resolution_secs", DataType::Float64, false),
        Field::new("avg_processing_secs", DataType::Float64, false),
        Field::new("total_resolution_secs", DataType::UInt64, false),
    ])
}

fn build_arrays(rows: &[FlatRow<'_>]) -> Vec<ArrayRef> {
    vec![
        Arc::new(StringArray::from(
            rows.iter().map(|r| r.experiment_id).collect::<Vec<_>>(),
        )),
        Arc::new(UInt64Array::from(
            rows.iter().map(|r| r.run_id as u64).collect::<Vec<_>>(),
        )),
        Arc::new(UInt64Array::from(
            rows.iter().map(|r| r.seed).collect::<Vec<_>>(),
        )),
        Arc::new(UInt64Array::from(
            rows.iter().map(|r| r.trials).collect::<Vec<_>>(),
        )),
        Arc::new(UInt64Array::from(
            rows.iter().map(|r| r.responders as u64).collect::<Vec<_>>(),
        )),
        Arc::new(UInt64Array::from(
            rows.iter().map(|r| r.operators as u64).collect::<Vec<_>>(),
        )),
        Arc::new(UInt64Array::from(
            rows.iter().map(|r| r.base_incidents).collect::<Vec<_>>(),
        )),
        Arc::new(UInt64Array::from(
            rows.iter()
                .map(|r| r.hangup_threshold_secs)
                .collect::<Vec<_>>(),
        )),
        Arc::new(Float64Array::from(
            rows.iter().map(|r| r.report_range_km).collect::<Vec<_>>(),
        )),
        Arc::new(UInt64Array::from(
            rows.iter().map(|r| r.trial).collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(
            rows.iter().map(|r| r.pipeline).collect::<Vec<_>>(),
        )),
        Arc::new(UInt64Array::from(
            rows.iter().map(|r| r.completed).collect::<Vec<_>>(),
        )),
        Arc::new(UInt64Array::from(
            rows.iter().map(|r| r.canceled).collect::<Vec<_>>(),
        )),
        Arc::new(UInt64Array::from(
            rows.iter().map(|r| r.self_completed).collect::<Vec<_>>(),
        )),
        Arc::new(Float64Array::from(
            rows.iter()
                .map(|r| r.avg_resolution_secs)
                .collect::<Vec<_>>(),
        )),
        Arc::new(Float64Array::from(
            rows.iter()
                .map(|r| r.avg_processing_secs)
                .collect::<Vec<_>>(),
        )),
        Arc::new(UInt64Array::from(
            rows.iter()
                .map(|r| r.total_resolution_secs)
                .collect::<Vec<_>>(),
        )),
    ]
}
