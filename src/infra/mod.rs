pub mod amtraker;
