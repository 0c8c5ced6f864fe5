pub mod unique_id;
