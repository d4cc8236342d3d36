mod permission_tests;
