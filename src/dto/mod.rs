pub mod mocktest_dto;
