pub mod check_toc;
pub mod encodings;
pub mod insert_toc;
pub mod toc;
