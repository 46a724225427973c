pub mod result_pipeline;
