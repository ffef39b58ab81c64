use super::*;
use crate::types::pagination::MAX_PER_PAGE;
use rstest::rstest;

fn page(page: u32, per_page: u32) -> PageRequest {
    PageRequest { page, per_page }
}

#[test]
fn test_page_request_default() {
    let request = PageRequest::default();
    assert_eq!(request.page, 1);
    assert_eq!(request.per_page, 20);
}

#[rstest]
#[case(page(1, 20), 0)]
#[case(page(2, 20), 20)]
#[case(page(3, 15), 30)]
fn test_page_request_offset(#[case] request: PageRequest, #[case] expected: u64) {
    assert_eq!(request.offset(), expected);
}

#[test]
fn test_page_request_clamped() {
    let request = page(0, 10_000).clamped();
    assert_eq!(request.page, 1);
    assert_eq!(request.per_page, MAX_PER_PAGE);
    assert_eq!(request.offset(), 0);

    assert_eq!(page(4, 0).clamped().per_page, 1);
}

#[rstest]
#[case(0, 10, 1)]
#[case(3, 10, 1)]
#[case(10, 10, 1)]
#[case(25, 10, 3)]
#[case(101, 20, 6)]
fn test_page_response_total_pages(#[case] total: u64, #[case] per_page: u32, #[case] pages: u64) {
    let response: PageResponse<i32> = PageResponse::new(vec![], page(1, per_page), total);
    assert_eq!(response.meta.total_pages, pages);
    assert_eq!(response.meta.total, total);
}

#[test]
fn test_page_response_map() {
    let response = PageResponse::new(vec![1, 2, 3], page(2, 3), 9).map(|n| n * 10);
    assert_eq!(response.data, vec![10, 20, 30]);
    assert_eq!(response.meta.page, 2);
    assert_eq!(response.meta.total_pages, 3);
}
