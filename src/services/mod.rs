pub mod activation_pipeline;
